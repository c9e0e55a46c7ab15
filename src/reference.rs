//! Static reference data
//!
//! The 12 maps are seeded from literals rather than scraped. Resources,
//! obelisks, supply drops and base spots are placeholder rows derived per
//! map; they carry real names but mostly no coordinates.

use chrono::NaiveDate;

use crate::models::{BaseSpotRecord, MapRecord, ObeliskRecord, ResourceRecord, SupplyDropRecord};

struct MapSeed {
    name: &'static str,
    slug: &'static str,
    official: bool,
    expansion: bool,
    released: (i32, u32, u32),
    size_km2: f64,
    description: &'static str,
}

const MAPS: &[MapSeed] = &[
    MapSeed { name: "The Island", slug: "the-island", official: true, expansion: false, released: (2017, 8, 29), size_km2: 48.0, description: "The original ARK: a tropical island ringed by three obelisks and crowned by a volcano." },
    MapSeed { name: "Scorched Earth", slug: "scorched-earth", official: true, expansion: true, released: (2016, 9, 1), size_km2: 48.0, description: "A harsh desert expansion with heat, sandstorms and wyverns." },
    MapSeed { name: "The Center", slug: "the-center", official: false, expansion: false, released: (2016, 5, 17), size_km2: 90.0, description: "A floating central island surrounded by lava and sky islands." },
    MapSeed { name: "Ragnarok", slug: "ragnarok", official: false, expansion: false, released: (2017, 6, 12), size_km2: 144.0, description: "A sprawling Norse and Celtic themed map with a mountain castle." },
    MapSeed { name: "Aberration", slug: "aberration", official: true, expansion: true, released: (2017, 12, 12), size_km2: 48.0, description: "A damaged underground ARK with radiation and glowing biomes." },
    MapSeed { name: "Extinction", slug: "extinction", official: true, expansion: true, released: (2018, 11, 6), size_km2: 48.0, description: "A ruined Earth overrun by Element corruption and titans." },
    MapSeed { name: "Valguero", slug: "valguero", official: false, expansion: false, released: (2019, 6, 18), size_km2: 64.0, description: "Open plains, a chalk cliff coast and the Aberrant trench." },
    MapSeed { name: "Genesis: Part 1", slug: "genesis-part-1", official: true, expansion: true, released: (2020, 2, 25), size_km2: 48.0, description: "A simulation of five biomes run by the HLN-A companion." },
    MapSeed { name: "Crystal Isles", slug: "crystal-isles", official: false, expansion: false, released: (2020, 6, 11), size_km2: 132.0, description: "Islands of giant crystals and wyvern-filled skies." },
    MapSeed { name: "Genesis: Part 2", slug: "genesis-part-2", official: true, expansion: true, released: (2021, 6, 3), size_km2: 48.0, description: "A colony ship with Eden and Rockwell's corrupted halves." },
    MapSeed { name: "Lost Island", slug: "lost-island", official: false, expansion: false, released: (2021, 12, 14), size_km2: 132.0, description: "A large island with the Sinomacrops, Amargasaurus and Dinopithecus." },
    MapSeed { name: "Fjordur", slug: "fjordur", official: false, expansion: false, released: (2022, 6, 12), size_km2: 120.0, description: "A Norse realm with four realms, Fenrisulfr and boss arenas." },
];

/// The 12 maps seeded at population time
pub fn official_maps() -> Vec<MapRecord> {
    MAPS.iter()
        .map(|m| MapRecord {
            name: m.name.to_string(),
            slug: m.slug.to_string(),
            is_official: m.official,
            is_expansion: m.expansion,
            release_date: NaiveDate::from_ymd_opt(m.released.0, m.released.1, m.released.2),
            size_km2: Some(m.size_km2),
            description: Some(m.description.to_string()),
        })
        .collect()
}

/// Wiki page title for a map name ("Genesis: Part 1" -> "Genesis:_Part_1")
pub fn wiki_page_for(map_name: &str) -> String {
    map_name.replace(' ', "_")
}

// ============================================================================
// Placeholder per-map data
// ============================================================================

const COMMON_RESOURCES: &[(&str, &str, &str)] = &[
    ("Metal", "ore", "common"),
    ("Crystal", "mineral", "common"),
    ("Obsidian", "mineral", "uncommon"),
    ("Oil", "liquid", "uncommon"),
    ("Silica Pearls", "ocean", "uncommon"),
    ("Black Pearls", "ocean", "rare"),
];

fn map_specific_resources(slug: &str) -> &'static [(&'static str, &'static str, &'static str)] {
    match slug {
        "scorched-earth" => &[("Sulfur", "mineral", "common"), ("Sand", "mineral", "abundant")],
        "aberration" => &[("Gems", "mineral", "common"), ("Congealed Gas Ball", "gas", "uncommon"), ("Element Ore", "element", "rare")],
        "extinction" => &[("Element Shards", "element", "uncommon"), ("Corrupted Nodule", "element", "rare")],
        "genesis-part-1" | "genesis-part-2" => &[("Element Shards", "element", "uncommon"), ("Fragmented Green Gem", "mineral", "rare")],
        "crystal-isles" => &[("Primal Crystal", "mineral", "uncommon")],
        "valguero" | "ragnarok" => &[("Element Ore", "element", "rare")],
        _ => &[],
    }
}

pub fn resources_for(slug: &str) -> Vec<ResourceRecord> {
    COMMON_RESOURCES
        .iter()
        .chain(map_specific_resources(slug).iter())
        .map(|(name, kind, abundance)| ResourceRecord {
            name: name.to_string(),
            resource_type: kind.to_string(),
            abundance: Some(abundance.to_string()),
            description: None,
        })
        .collect()
}

/// Red, green and blue obelisks; only maps with the classic terminal layout
pub fn obelisks_for(slug: &str) -> Vec<ObeliskRecord> {
    let coords: [(f64, f64); 3] = match slug {
        "the-island" => [(79.5, 17.3), (59.1, 72.3), (25.5, 25.6)],
        "the-center" | "ragnarok" | "valguero" | "crystal-isles" | "lost-island" | "fjordur" => {
            return ["Red", "Green", "Blue"]
                .iter()
                .map(|color| ObeliskRecord {
                    color: color.to_string(),
                    latitude: None,
                    longitude: None,
                    description: Some(format!("{} obelisk terminal", color)),
                })
                .collect();
        }
        _ => return Vec::new(),
    };

    ["Red", "Green", "Blue"]
        .iter()
        .zip(coords)
        .map(|(color, (lat, lon))| ObeliskRecord {
            color: color.to_string(),
            latitude: Some(lat),
            longitude: Some(lon),
            description: Some(format!("{} obelisk terminal", color)),
        })
        .collect()
}

const SUPPLY_TIERS: &[(&str, i32, &str)] = &[
    ("White", 3, "Primitive"),
    ("Green", 15, "Ramshackle"),
    ("Blue", 25, "Apprentice"),
    ("Purple", 35, "Journeyman"),
    ("Yellow", 45, "Mastercraft"),
    ("Red", 60, "Ascendant"),
];

pub fn supply_drops_for(_slug: &str) -> Vec<SupplyDropRecord> {
    SUPPLY_TIERS
        .iter()
        .map(|(tier, min_level, quality)| SupplyDropRecord {
            tier: tier.to_string(),
            min_level: *min_level,
            quality: Some(quality.to_string()),
            description: Some(format!("{} beacon, level {}+", tier, min_level)),
        })
        .collect()
}

pub fn base_spots_for(slug: &str) -> Vec<BaseSpotRecord> {
    let spots: &[(&str, &str)] = match slug {
        "the-island" => &[("Herbivore Island", "easy"), ("Hidden Lake", "medium"), ("Carnivore Island Cliffs", "hard")],
        "ragnarok" => &[("Viking Bay", "easy"), ("Highlands Waterfall", "medium"), ("Ice Wyvern Cliffs", "hard")],
        _ => &[("Coastal Plateau", "easy"), ("River Valley", "medium"), ("Mountain Ledge", "hard")],
    };
    spots
        .iter()
        .map(|(name, difficulty)| BaseSpotRecord {
            name: name.to_string(),
            difficulty: Some(difficulty.to_string()),
            description: None,
            latitude: None,
            longitude: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_twelve_unique_maps() {
        let maps = official_maps();
        assert_eq!(maps.len(), 12);
        let slugs: HashSet<_> = maps.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs.len(), 12);
        assert!(maps.iter().all(|m| m.release_date.is_some()));
    }

    #[test]
    fn test_wiki_page_for() {
        assert_eq!(wiki_page_for("Genesis: Part 1"), "Genesis:_Part_1");
        assert_eq!(wiki_page_for("Lost Island"), "Lost_Island");
    }

    #[test]
    fn test_placeholder_rows() {
        assert_eq!(obelisks_for("the-island").len(), 3);
        assert!(obelisks_for("the-island").iter().all(|o| o.latitude.is_some()));
        assert!(obelisks_for("aberration").is_empty());
        assert!(resources_for("scorched-earth").iter().any(|r| r.name == "Sulfur"));
        assert_eq!(supply_drops_for("fjordur").len(), 6);
        assert_eq!(base_spots_for("valguero").len(), 3);
    }
}
