//! Mock Data - built-in dataset served when no database is configured
//!
//! Maps and per-map placeholders come from `crate::reference`; this module
//! adds a starter set of creatures (with stats and taming data), regions
//! and caves so every read route has something to return.

use crate::models::{CaveRecord, CreatureRecord, RegionRecord, StatRecord, TamingRecord};

pub struct MockCreature {
    pub creature: CreatureRecord,
    pub stats: Vec<StatRecord>,
    pub taming: Option<TamingRecord>,
}

/// (health, stamina, food, weight, melee, speed) base values
type BaseStats = (f64, f64, f64, f64, f64, f64);

fn creature(
    name: &str,
    slug: &str,
    temperament: &str,
    diet: &str,
    flags: (bool, bool, bool),
    base: BaseStats,
) -> CreatureRecord {
    CreatureRecord {
        name: name.into(),
        slug: slug.into(),
        temperament: Some(temperament.into()),
        diet: Some(diet.into()),
        is_tameable: flags.0,
        is_rideable: flags.1,
        is_breedable: flags.2,
        base_health: Some(base.0),
        base_stamina: Some(base.1),
        base_food: Some(base.2),
        base_weight: Some(base.3),
        base_damage: Some(base.4),
        base_speed: Some(base.5),
        wiki_url: Some(format!("https://ark.wiki.gg/wiki/{}", name.replace(' ', "_"))),
        dododex_id: Some(slug.into()),
    }
}

fn stats(base: BaseStats) -> Vec<StatRecord> {
    let rows = [
        ("Health", base.0, 0.2, 0.054),
        ("Stamina", base.1, 0.1, 0.1),
        ("Food", base.2, 0.1, 0.1),
        ("Weight", base.3, 0.02, 0.04),
        ("Melee Damage", base.4, 0.05, 0.017),
        ("Movement Speed", base.5, 0.0, 0.01),
    ];
    rows.iter()
        .map(|(name, value, wild, tamed)| StatRecord {
            stat_name: name.to_string(),
            base_value: *value,
            wild_per_level: Some(value * wild),
            tamed_per_level: Some(value * tamed),
        })
        .collect()
}

fn taming(method: &str, foods: &[&str], kibble: Option<&str>, quantity: i32, minutes: f64, torpor: Option<f64>) -> TamingRecord {
    TamingRecord {
        method: method.into(),
        preferred_foods: foods.iter().map(|f| f.to_string()).collect(),
        kibble_type: kibble.map(String::from),
        base_food_quantity: quantity,
        base_taming_time: minutes,
        torpor_depletion_rate: torpor.map(|t| t / 100.0),
        base_torpor: torpor,
        feeding_interval: Some(minutes * 60.0 / quantity.max(1) as f64),
    }
}

pub fn creatures() -> Vec<MockCreature> {
    let carnivore = ["Kibble", "Raw Mutton", "Raw Prime Meat", "Raw Meat"];
    let herbivore = ["Kibble", "Crops", "Mejoberry", "Berries"];

    let rows: Vec<(CreatureRecord, BaseStats, Option<TamingRecord>)> = vec![
        {
            let base = (1100.0, 420.0, 3000.0, 500.0, 62.0, 100.0);
            (
                creature("Rex", "rex", "Aggressive", "Carnivore", (true, true, true), base),
                base,
                Some(taming("knockout", &carnivore, Some("Exceptional Kibble"), 27, 148.0, Some(1550.0))),
            )
        },
        {
            let base = (200.0, 150.0, 1200.0, 140.0, 15.0, 100.0);
            (
                creature("Raptor", "raptor", "Aggressive", "Carnivore", (true, true, true), base),
                base,
                Some(taming("knockout", &carnivore, Some("Simple Kibble"), 9, 23.0, Some(180.0))),
            )
        },
        {
            let base = (365.0, 350.0, 2000.0, 400.0, 20.0, 100.0);
            (
                creature("Argentavis", "argentavis", "Neutral", "Carrion-Feeder", (true, true, true), base),
                base,
                Some(taming("knockout", &carnivore, Some("Superior Kibble"), 18, 81.0, Some(600.0))),
            )
        },
        {
            let base = (375.0, 150.0, 3000.0, 365.0, 32.0, 100.0);
            (
                creature("Triceratops", "triceratops", "Territorial", "Herbivore", (true, true, true), base),
                base,
                Some(taming("knockout", &herbivore, Some("Simple Kibble"), 15, 46.0, Some(250.0))),
            )
        },
        {
            let base = (210.0, 150.0, 1200.0, 120.0, 15.0, 100.0);
            (
                creature("Pteranodon", "pteranodon", "Skittish", "Carnivore", (true, true, true), base),
                base,
                Some(taming("knockout", &carnivore, Some("Simple Kibble"), 8, 19.0, Some(120.0))),
            )
        },
        {
            let base = (40.0, 100.0, 450.0, 50.0, 5.0, 100.0);
            (
                creature("Dodo", "dodo", "Passive", "Herbivore", (true, false, true), base),
                base,
                Some(taming("knockout", &herbivore, Some("Basic Kibble"), 3, 4.0, Some(30.0))),
            )
        },
        {
            let base = (80000.0, 400.0, 4000.0, 700.0, 36.0, 100.0);
            (
                creature("Giganotosaurus", "giganotosaurus", "Aggressive", "Carnivore", (true, true, true), base),
                base,
                Some(taming("knockout", &carnivore, Some("Exceptional Kibble"), 40, 205.0, Some(10000.0))),
            )
        },
        {
            let base = (700.0, 175.0, 3000.0, 250.0, 25.0, 100.0);
            (
                creature("Ankylosaurus", "ankylosaurus", "Docile", "Herbivore", (true, true, true), base),
                base,
                Some(taming("knockout", &herbivore, Some("Regular Kibble"), 14, 44.0, Some(420.0))),
            )
        },
        {
            let base = (1750.0, 300.0, 1500.0, 250.0, 20.0, 100.0);
            (
                creature("Basilosaurus", "basilosaurus", "Passive", "Carnivore", (true, true, true), base),
                base,
                Some(taming("passive", &["Kibble", "Raw Prime Fish Meat", "Raw Fish Meat"], Some("Superior Kibble"), 20, 95.0, None)),
            )
        },
        {
            let base = (400.0, 280.0, 1200.0, 180.0, 20.0, 100.0);
            (
                creature("Megalodon", "megalodon", "Aggressive", "Carnivore", (true, true, false), base),
                base,
                Some(taming("knockout", &carnivore, Some("Regular Kibble"), 10, 28.0, Some(800.0))),
            )
        },
        {
            let base = (1500.0, 250.0, 1000.0, 400.0, 60.0, 100.0);
            (
                creature("Titanoboa", "titanoboa", "Aggressive", "Carnivore", (false, false, false), base),
                base,
                None,
            )
        },
    ];

    rows.into_iter()
        .map(|(creature, base, taming)| MockCreature {
            creature,
            stats: stats(base),
            taming,
        })
        .collect()
}

fn region(name: &str, category: &str, description: &str) -> RegionRecord {
    RegionRecord {
        name: name.into(),
        category: category.into(),
        description: Some(description.into()),
        image_url: None,
        wiki_url: None,
    }
}

/// (map slug, region)
pub fn regions() -> Vec<(&'static str, RegionRecord)> {
    vec![
        ("the-island", region("Southern Islets", "coast", "Small islands along the southern coast, ideal for new survivors.")),
        ("the-island", region("Redwood Forest", "forest", "Giant redwoods with rich wood and thatch.")),
        ("the-island", region("Far North Snow Mountains", "snow", "Frozen peaks in the north.")),
        ("the-island", region("Volcano", "volcanic", "The central volcano, rich in metal and obsidian.")),
        ("the-island", region("Bog", "swamp", "Murky swamp with leeches and Sarcos.")),
        ("the-island", region("Grand Hills", "grassland", "Rolling hills east of the volcano.")),
        ("scorched-earth", region("The Dunes", "desert", "Open sand with wyverns overhead.")),
        ("scorched-earth", region("Oasis", "water", "Fresh water in the middle of the desert.")),
        ("aberration", region("Fertile Chamber", "forest", "Lush cavern biome near the surface.")),
        ("aberration", region("Bioluminescent Chamber", "cave", "Glowing cavern with mushrooms and shinehorns.")),
        ("ragnarok", region("Highlands", "mountain", "Cold highland plateau with a waterfall.")),
        ("ragnarok", region("Jungle Dungeon", "cave", "Dense jungle with a dungeon entrance.")),
        ("valguero", region("Aberrant Trench", "cave", "A glowing trench cut into the map.")),
        ("lost-island", region("Redwood Valley", "forest", "Redwood grove in the central valley.")),
        ("genesis-part-1", region("Bog Biome", "swamp", "Simulation swamp with toxic water.")),
        ("genesis-part-1", region("Volcanic Biome", "volcanic", "Simulation volcano with moving lava.")),
        ("crystal-isles", region("Crystal Wyvern Kingdom", "mountain", "Spire of crystal wyvern nests.")),
        ("fjordur", region("Jotunheim", "snow", "The frozen realm of giants.")),
    ]
}

fn cave(name: &str, difficulty: &str, artifact: Option<&str>, lat: f64, lon: f64) -> CaveRecord {
    CaveRecord {
        name: name.into(),
        difficulty: Some(difficulty.into()),
        artifact: artifact.map(String::from),
        description: None,
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

pub fn caves() -> Vec<(&'static str, CaveRecord)> {
    vec![
        ("the-island", cave("Central Cave", "medium", Some("Artifact of the Hunter"), 41.5, 46.9)),
        ("the-island", cave("Lava Cave", "hard", Some("Artifact of the Massive"), 70.6, 86.1)),
        ("the-island", cave("Swamp Cave", "hard", Some("Artifact of the Immune"), 62.8, 37.3)),
        ("the-island", cave("Caverns of Lost Faith", "medium", Some("Artifact of the Cunning"), 53.7, 10.5)),
        ("the-island", cave("Lower South Cave", "easy", Some("Artifact of the Clever"), 80.3, 53.5)),
        ("scorched-earth", cave("Crystal Caves", "medium", None, 32.1, 81.0)),
        ("ragnarok", cave("Life's Labyrinth", "hard", Some("Artifact of the Immune"), 52.0, 31.7)),
    ]
}
