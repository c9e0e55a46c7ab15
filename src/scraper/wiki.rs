//! Wiki scraper
//!
//! Reads the creature index, individual creature pages (infobox + base
//! stats table) and map pages (regions via the parser registry, caves from
//! the caves section). Fetching goes through the injected `PageSource`;
//! parsing is synchronous and never holds a document across an await.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::html::{self, sel};
use super::normalize::{parse_number, parse_numbers, parse_yes_no, slugify};
use super::regions::{RegionContext, RegionParserRegistry};
use super::source::{PageSource, ScrapeError};
use crate::models::{CaveRecord, CreatureRecord, MapRef, RegionRecord, StatRecord};
use crate::reference::wiki_page_for;

pub const DEFAULT_WIKI_BASE_URL: &str = "https://ark.wiki.gg/wiki/";

/// Entry of the creature index
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureLink {
    pub name: String,
    pub slug: String,
    pub url: String,
}

/// Creature page contents
#[derive(Debug, Clone)]
pub struct ScrapedCreature {
    pub creature: CreatureRecord,
    pub stats: Vec<StatRecord>,
}

pub struct WikiScraper {
    source: Arc<dyn PageSource>,
    base_url: String,
    regions: RegionParserRegistry,
}

impl WikiScraper {
    pub fn new(source: Arc<dyn PageSource>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            source,
            base_url,
            regions: RegionParserRegistry::default(),
        }
    }

    pub fn with_registry(mut self, regions: RegionParserRegistry) -> Self {
        self.regions = regions;
        self
    }

    pub fn page_url(&self, title: &str) -> String {
        format!("{}{}", self.base_url, title)
    }

    /// Creature names and page URLs from the index, de-duplicated
    pub async fn creature_index(&self, limit: usize) -> Result<Vec<CreatureLink>, ScrapeError> {
        let url = self.page_url("Creatures");
        let page = self.source.fetch(&url).await?;
        let mut links = parse_creature_index(&page, &self.base_url);
        links.truncate(limit);
        debug!("Creature index: {} entries", links.len());
        Ok(links)
    }

    pub async fn creature(&self, link: &CreatureLink) -> Result<ScrapedCreature, ScrapeError> {
        let page = self.source.fetch(&link.url).await?;
        parse_creature_page(&page, link)
    }

    pub async fn map_regions(&self, map: &MapRef) -> Result<Vec<RegionRecord>, ScrapeError> {
        let url = self.page_url(&wiki_page_for(&map.name));
        let page = self.source.fetch(&url).await?;
        let ctx = RegionContext {
            map_slug: map.slug.clone(),
            map_name: map.name.clone(),
            page_url: url,
        };
        Ok(self.regions.parse_page(&page, &ctx))
    }

    pub async fn map_caves(&self, map: &MapRef) -> Result<Vec<CaveRecord>, ScrapeError> {
        let url = self.page_url(&wiki_page_for(&map.name));
        let page = self.source.fetch(&url).await?;
        Ok(parse_caves(&page))
    }
}

// ============================================================================
// Creature index
// ============================================================================

fn is_article_link(href: &str) -> bool {
    !href.contains(':') || href.starts_with("http")
}

pub fn parse_creature_index(page: &str, base_url: &str) -> Vec<CreatureLink> {
    let doc = Html::parse_document(page);
    let (Ok(tables), Ok(row_sel), Ok(cell_sel), Ok(link_sel)) =
        (sel("table.wikitable, table.sortable"), sel("tr"), sel("td"), sel("a[href]"))
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for table in doc.select(&tables) {
        for row in table.select(&row_sel) {
            let Some(cell) = row.select(&cell_sel).next() else {
                continue;
            };
            let Some(link) = cell
                .select(&link_sel)
                .find(|a| !html::element_text(*a).is_empty())
            else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if href.starts_with('#') || !is_article_link(href.trim_start_matches("/wiki/")) {
                continue;
            }

            let name = html::element_text(link);
            let slug = slugify(&name);
            if slug.is_empty() || !seen.insert(slug.clone()) {
                continue;
            }
            out.push(CreatureLink {
                name,
                slug,
                url: html::absolute_url(base_url, href),
            });
        }
    }

    out
}

// ============================================================================
// Creature page
// ============================================================================

/// Label → value pairs from either infobox flavour
fn infobox_fields(doc: &Html) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    if let (Ok(item), Ok(label), Ok(value)) = (sel(".pi-data"), sel(".pi-data-label"), sel(".pi-data-value")) {
        for data in doc.select(&item) {
            if let (Some(l), Some(v)) = (data.select(&label).next(), data.select(&value).next()) {
                fields.insert(html::element_text(l).to_lowercase(), html::element_text(v));
            }
        }
    }

    if let (Ok(rows), Ok(cell_sel)) = (sel("table.infobox tr, .info-framework tr"), sel("th, td")) {
        for row in doc.select(&rows) {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
            if let [label, value, ..] = cells.as_slice() {
                fields
                    .entry(html::element_text(*label).trim_end_matches(':').to_lowercase())
                    .or_insert_with(|| html::element_text(*value));
            }
        }
    }

    fields
}

/// Exact label first, then the shortest label starting with `key`, then the
/// shortest containing it. "Tameable" never resolves to "Untameable" while
/// both are present.
fn field<'a>(fields: &'a BTreeMap<String, String>, key: &str) -> Option<&'a String> {
    if let Some(value) = fields.get(key) {
        return Some(value);
    }
    shortest_label(fields, |label| label.starts_with(key)).or_else(|| shortest_label(fields, |label| label.contains(key)))
}

fn shortest_label<'a>(fields: &'a BTreeMap<String, String>, matches: impl Fn(&str) -> bool) -> Option<&'a String> {
    fields
        .iter()
        .filter(|(label, _)| matches(label.as_str()))
        .min_by_key(|(label, _)| label.len())
        .map(|(_, value)| value)
}

/// Rows of the base stats table: (name, base, wild per level, tamed per level)
fn base_stats(doc: &Html) -> Vec<StatRecord> {
    let Ok(table_sel) = sel("table") else {
        return Vec::new();
    };

    for table in doc.select(&table_sel) {
        let parsed = html::parse_table(table);
        let Some(base_col) = parsed.column(&["base"]) else {
            continue;
        };
        let Some(name_col) = parsed.column(&["attribute", "stat"]) else {
            continue;
        };
        let wild_col = parsed.column(&["wild"]);
        let tamed_col = parsed.column(&["tamed"]);

        let stats: Vec<StatRecord> = parsed
            .rows
            .iter()
            .filter_map(|row| {
                let name = row.get(name_col)?.trim();
                let base_value = row.get(base_col).and_then(|v| parse_number(v))?;
                if name.is_empty() {
                    return None;
                }
                Some(StatRecord {
                    stat_name: name.to_string(),
                    base_value,
                    wild_per_level: wild_col.and_then(|c| row.get(c)).and_then(|v| parse_number(v)),
                    tamed_per_level: tamed_col.and_then(|c| row.get(c)).and_then(|v| parse_number(v)),
                })
            })
            .collect();

        if !stats.is_empty() {
            return stats;
        }
    }

    Vec::new()
}

fn stat_value(stats: &[StatRecord], keywords: &[&str]) -> Option<f64> {
    stats
        .iter()
        .find(|s| {
            let name = s.stat_name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
        .map(|s| s.base_value)
}

pub fn parse_creature_page(page: &str, link: &CreatureLink) -> Result<ScrapedCreature, ScrapeError> {
    let doc = Html::parse_document(page);
    let fields = infobox_fields(&doc);
    let stats = base_stats(&doc);

    if fields.is_empty() && stats.is_empty() {
        return Err(ScrapeError::Parse(format!("no infobox or stats on {}", link.url)));
    }

    let flag = |key: &str| field(&fields, key).and_then(|v| parse_yes_no(v)).unwrap_or(false);

    let creature = CreatureRecord {
        name: link.name.clone(),
        slug: link.slug.clone(),
        temperament: field(&fields, "temperament").cloned(),
        diet: field(&fields, "diet").cloned(),
        is_tameable: flag("tameable"),
        is_rideable: flag("rideable"),
        is_breedable: flag("breedable"),
        base_health: stat_value(&stats, &["health"]),
        base_stamina: stat_value(&stats, &["stamina"]),
        base_food: stat_value(&stats, &["food"]),
        base_weight: stat_value(&stats, &["weight"]),
        base_damage: stat_value(&stats, &["melee", "damage"]),
        base_speed: stat_value(&stats, &["speed"]),
        wiki_url: Some(link.url.clone()),
        dododex_id: Some(link.slug.clone()),
    };

    Ok(ScrapedCreature { creature, stats })
}

// ============================================================================
// Caves
// ============================================================================

fn artifact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Artifact of the [A-Z][a-z]+").expect("artifact regex"))
}

fn cave_difficulty(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ["extreme", "hard", "medium", "easy"]
        .iter()
        .find(|d| lower.contains(*d))
        .map(|d| d.to_string())
}

fn cave_record(name: &str, detail: &str, coords: Option<&str>) -> Option<CaveRecord> {
    let name = name.trim();
    if name.is_empty() || name.len() > 150 {
        return None;
    }
    let numbers = coords.map(parse_numbers).unwrap_or_default();
    let (latitude, longitude) = match numbers.as_slice() {
        [lat, lon, ..] => (Some(*lat), Some(*lon)),
        _ => (None, None),
    };
    Some(CaveRecord {
        name: name.to_string(),
        difficulty: cave_difficulty(detail),
        artifact: artifact_re().find(detail).map(|m| m.as_str().to_string()),
        description: Some(detail.trim().to_string()).filter(|d| !d.is_empty()),
        latitude,
        longitude,
    })
}

pub fn parse_caves(page: &str) -> Vec<CaveRecord> {
    let doc = Html::parse_document(page);
    let (Ok(table_sel), Ok(li_sel)) = (sel("table"), sel("li")) else {
        return Vec::new();
    };
    let all = html::sections(&doc);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for section in html::sections_under(&all, &["cave"]) {
        for table in section.select(&table_sel) {
            let parsed = html::parse_table(table);
            let name_col = parsed.column(&["name", "cave"]).unwrap_or(0);
            let coord_col = parsed.column(&["coord", "location", "lat"]);
            for row in &parsed.rows {
                let Some(name) = row.get(name_col) else {
                    continue;
                };
                let detail = row.join(" ");
                let coords = coord_col.and_then(|c| row.get(c)).map(String::as_str);
                out.extend(cave_record(name, &detail, coords));
            }
        }

        for item in section.select(&li_sel) {
            let text = html::element_text(item);
            let (name, detail) = match text.split_once(" - ").or_else(|| text.split_once(": ")) {
                Some((name, detail)) => (name.to_string(), detail.to_string()),
                None => (text.clone(), String::new()),
            };
            out.extend(cave_record(&name, &format!("{} {}", name, detail), None));
        }
    }

    out.retain(|c| seen.insert(c.name.to_lowercase()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<div class="mw-parser-output"><table class="wikitable">
        <tr><th>Name</th><th>Diet</th></tr>
        <tr><td><a href="/wiki/File:Rex.png"><img src="x"></a> <a href="/wiki/Rex">Rex</a></td><td>Carnivore</td></tr>
        <tr><td><a href="/wiki/Raptor">Raptor</a></td><td>Carnivore</td></tr>
        <tr><td><a href="/wiki/Rex">Rex</a></td><td>Carnivore</td></tr>
        <tr><td><a href="/wiki/Category:Creatures">Category</a></td><td></td></tr>
    </table></div>"#;

    const CREATURE: &str = r#"<div class="mw-parser-output">
        <aside class="portable-infobox">
            <div class="pi-data"><h3 class="pi-data-label">Temperament</h3><div class="pi-data-value">Aggressive</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Diet</h3><div class="pi-data-value">Carnivore</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Tameable</h3><div class="pi-data-value">Yes</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Rideable</h3><div class="pi-data-value">Yes</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Breedable</h3><div class="pi-data-value">No</div></div>
        </aside>
        <h2>Base Stats and Growth</h2>
        <table class="wikitable">
            <tr><th>Attribute</th><th>Base Value</th><th>Level Increase Wild</th><th>Level Increase Tamed</th></tr>
            <tr><td>Health</td><td>1,100</td><td>+220</td><td>+5.4%</td></tr>
            <tr><td>Stamina</td><td>420</td><td>+42</td><td>+10%</td></tr>
            <tr><td>Melee Damage</td><td>62</td><td>+3.1</td><td>+1.7%</td></tr>
            <tr><td>Movement Speed</td><td>100%</td><td>N/A</td><td>N/A</td></tr>
        </table>
    </div>"#;

    const MAP: &str = r#"<div class="mw-parser-output">
        <h2>Caves</h2>
        <table class="wikitable">
            <tr><th>Name</th><th>Location</th><th>Difficulty</th><th>Artifact</th></tr>
            <tr><td>Central Cave</td><td>41.5, 46.9</td><td>Medium</td><td>Artifact of the Hunter</td></tr>
        </table>
        <ul><li>Swamp Cave - Hard, home of the Artifact of the Immune</li><li>Central Cave</li></ul>
        <h2>Resources</h2><ul><li>Metal</li></ul>
    </div>"#;

    #[test]
    fn test_creature_index_dedupes_and_skips_namespaces() {
        let links = parse_creature_index(INDEX, "https://ark.wiki.gg/wiki/");
        let names: Vec<&str> = links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Rex", "Raptor"]);
        assert_eq!(links[0].url, "https://ark.wiki.gg/wiki/Rex");
        assert_eq!(links[0].slug, "rex");
    }

    #[test]
    fn test_creature_page() {
        let link = CreatureLink {
            name: "Rex".into(),
            slug: "rex".into(),
            url: "https://ark.wiki.gg/wiki/Rex".into(),
        };
        let scraped = parse_creature_page(CREATURE, &link).unwrap();
        let c = &scraped.creature;
        assert_eq!(c.temperament.as_deref(), Some("Aggressive"));
        assert!(c.is_tameable && c.is_rideable && !c.is_breedable);
        assert_eq!(c.base_health, Some(1100.0));
        assert_eq!(c.base_damage, Some(62.0));
        assert_eq!(scraped.stats.len(), 4);
        assert_eq!(scraped.stats[0].wild_per_level, Some(220.0));
        assert_eq!(scraped.stats[3].wild_per_level, None);
    }

    #[test]
    fn test_overlapping_infobox_labels_resolve_consistently() {
        let page = r#"<aside class="portable-infobox">
            <div class="pi-data"><h3 class="pi-data-label">Untameable</h3><div class="pi-data-value">No</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Tameable</h3><div class="pi-data-value">Yes</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Diet notes</h3><div class="pi-data-value">Eats raw meat only</div></div>
            <div class="pi-data"><h3 class="pi-data-label">Diet</h3><div class="pi-data-value">Carnivore</div></div>
        </aside>"#;
        let link = CreatureLink {
            name: "Rex".into(),
            slug: "rex".into(),
            url: "u".into(),
        };

        for _ in 0..32 {
            let c = parse_creature_page(page, &link).unwrap().creature;
            assert!(c.is_tameable);
            assert_eq!(c.diet.as_deref(), Some("Carnivore"));
        }
    }

    #[test]
    fn test_field_prefers_prefix_over_substring() {
        let fields: BTreeMap<String, String> = [
            ("diet (wild)".to_string(), "Carnivore".to_string()),
            ("preferred diet".to_string(), "Kibble".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(field(&fields, "diet").map(String::as_str), Some("Carnivore"));
        assert_eq!(field(&fields, "kibble"), None);
    }

    #[test]
    fn test_creature_page_without_data_is_error() {
        let link = CreatureLink {
            name: "Ghost".into(),
            slug: "ghost".into(),
            url: "u".into(),
        };
        assert!(parse_creature_page("<p>stub</p>", &link).is_err());
    }

    #[test]
    fn test_caves_from_tables_and_lists() {
        let caves = parse_caves(MAP);
        assert_eq!(caves.len(), 2);
        assert_eq!(caves[0].name, "Central Cave");
        assert_eq!(caves[0].latitude, Some(41.5));
        assert_eq!(caves[0].artifact.as_deref(), Some("Artifact of the Hunter"));
        assert_eq!(caves[0].difficulty.as_deref(), Some("medium"));
        assert_eq!(caves[1].name, "Swamp Cave");
        assert_eq!(caves[1].difficulty.as_deref(), Some("hard"));
        assert_eq!(caves[1].artifact.as_deref(), Some("Artifact of the Immune"));
    }
}
