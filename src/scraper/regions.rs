//! Region parsers
//!
//! Map pages lay out their regions differently: some as tables, some as
//! bullet lists, some as one sub-heading per region. Each layout is a
//! `RegionParser`; `RegionParserRegistry` picks one per map slug and falls
//! back to a generic parser that tries every layout in turn.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use scraper::Html;

use super::html::{self, sel, Section};
use super::normalize::categorize_region;
use crate::models::RegionRecord;

const REGION_KEYWORDS: &[&str] = &["region", "biome", "area", "zone", "location"];
const MAX_NAME_LEN: usize = 150;

/// What a parser knows about the page it is reading
#[derive(Debug, Clone)]
pub struct RegionContext {
    pub map_slug: String,
    pub map_name: String,
    pub page_url: String,
}

pub trait RegionParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord>;
}

fn record(name: &str, description: Option<String>, ctx: &RegionContext) -> Option<RegionRecord> {
    let name = name.trim().trim_end_matches(':').trim();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return None;
    }
    Some(RegionRecord {
        name: name.to_string(),
        category: categorize_region(name).to_string(),
        description: description.filter(|d| !d.is_empty()),
        image_url: None,
        wiki_url: Some(format!("{}#{}", ctx.page_url, name.replace(' ', "_"))),
    })
}

/// First occurrence of each name wins
fn dedupe(records: Vec<RegionRecord>) -> Vec<RegionRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.name.to_lowercase()))
        .collect()
}

fn region_sections<'s, 'a>(all: &'s [Section<'a>]) -> Vec<&'s Section<'a>> {
    html::sections_under(all, REGION_KEYWORDS)
}

/// Split "Name - description" / "Name: description" list entries
fn split_entry(text: &str) -> (&str, Option<String>) {
    for sep in [" - ", " – ", " — ", ": "] {
        if let Some((name, rest)) = text.split_once(sep) {
            return (name, Some(rest.trim().to_string()));
        }
    }
    (text, None)
}

// ============================================================================
// Layout parsers
// ============================================================================

/// Regions listed in wiki tables (name column plus optional description)
pub struct TableRegionParser;

impl RegionParser for TableRegionParser {
    fn name(&self) -> &'static str {
        "table"
    }

    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord> {
        let Ok(table_sel) = sel("table") else {
            return Vec::new();
        };
        let all = html::sections(doc);
        let mut out = Vec::new();

        for section in region_sections(&all) {
            for table in section.select(&table_sel) {
                let parsed = html::parse_table(table);
                let name_col = parsed.column(&["name", "region", "area", "biome"]).unwrap_or(0);
                let desc_col = parsed.column(&["description", "notes", "details"]);
                for row in &parsed.rows {
                    let Some(name) = row.get(name_col) else {
                        continue;
                    };
                    let description = desc_col.and_then(|c| row.get(c)).cloned();
                    out.extend(record(name, description, ctx));
                }
            }
        }

        dedupe(out)
    }
}

/// Regions given as bullet lists, "Name - description"
pub struct ListRegionParser;

impl RegionParser for ListRegionParser {
    fn name(&self) -> &'static str {
        "list"
    }

    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord> {
        let Ok(li) = sel("li") else {
            return Vec::new();
        };
        let all = html::sections(doc);
        let mut out = Vec::new();

        for section in region_sections(&all) {
            for item in section.select(&li) {
                let text = html::element_text(item);
                let (name, description) = split_entry(&text);
                out.extend(record(name, description, ctx));
            }
        }

        dedupe(out)
    }
}

/// One sub-heading per region, described by the paragraph beneath it
pub struct SubheadingRegionParser;

impl RegionParser for SubheadingRegionParser {
    fn name(&self) -> &'static str {
        "subheading"
    }

    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord> {
        let Ok(p) = sel("p") else {
            return Vec::new();
        };
        let all = html::sections(doc);
        let matched = region_sections(&all);
        let Some(parent_level) = matched.first().map(|s| s.level) else {
            return Vec::new();
        };

        let out = matched
            .iter()
            .filter(|s| s.level > parent_level)
            .filter_map(|s| {
                let description = s.select(&p).first().map(|el| html::element_text(*el));
                record(&s.title, description, ctx)
            })
            .collect();

        dedupe(out)
    }
}

/// Genesis simulations: biome tables or lists, else the known biome set
pub struct GenesisRegionParser {
    known_biomes: &'static [&'static str],
}

pub const GENESIS_ONE_BIOMES: &[&str] = &["Bog Biome", "Arctic Biome", "Ocean Biome", "Volcanic Biome", "Lunar Biome"];
pub const GENESIS_TWO_BIOMES: &[&str] = &["Eden Biome", "Rockwell's Innards", "Space", "Canyon Biome", "Wasteland Biome"];

impl GenesisRegionParser {
    pub fn new(known_biomes: &'static [&'static str]) -> Self {
        Self { known_biomes }
    }
}

impl RegionParser for GenesisRegionParser {
    fn name(&self) -> &'static str {
        "genesis"
    }

    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord> {
        let mut found = TableRegionParser.parse(doc, ctx);
        if found.is_empty() {
            found = ListRegionParser.parse(doc, ctx);
        }
        if !found.is_empty() {
            return found;
        }

        self.known_biomes
            .iter()
            .filter_map(|name| record(name, Some(format!("{} simulation biome", ctx.map_name)), ctx))
            .collect()
    }
}

/// Tries sub-headings, then tables, then lists
pub struct GenericRegionParser;

impl RegionParser for GenericRegionParser {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn parse(&self, doc: &Html, ctx: &RegionContext) -> Vec<RegionRecord> {
        let strategies: [&dyn RegionParser; 3] = [&SubheadingRegionParser, &TableRegionParser, &ListRegionParser];
        strategies
            .iter()
            .map(|p| p.parse(doc, ctx))
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct RegionParserRegistry {
    by_slug: HashMap<String, Arc<dyn RegionParser>>,
    fallback: Arc<dyn RegionParser>,
}

impl Default for RegionParserRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("lost-island", Arc::new(TableRegionParser));
        registry.register("crystal-isles", Arc::new(ListRegionParser));
        registry.register("valguero", Arc::new(SubheadingRegionParser));
        registry.register("genesis-part-1", Arc::new(GenesisRegionParser::new(GENESIS_ONE_BIOMES)));
        registry.register("genesis-part-2", Arc::new(GenesisRegionParser::new(GENESIS_TWO_BIOMES)));
        registry
    }
}

impl RegionParserRegistry {
    /// Registry with only the generic fallback
    pub fn empty() -> Self {
        Self {
            by_slug: HashMap::new(),
            fallback: Arc::new(GenericRegionParser),
        }
    }

    pub fn register(&mut self, map_slug: &str, parser: Arc<dyn RegionParser>) {
        self.by_slug.insert(map_slug.to_string(), parser);
    }

    pub fn parser_for(&self, map_slug: &str) -> &dyn RegionParser {
        self.by_slug
            .get(map_slug)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    /// Parse a map page with the parser registered for its slug
    pub fn parse_page(&self, page: &str, ctx: &RegionContext) -> Vec<RegionRecord> {
        let doc = Html::parse_document(page);
        self.parser_for(&ctx.map_slug).parse(&doc, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(slug: &str) -> RegionContext {
        RegionContext {
            map_slug: slug.into(),
            map_name: "Test Map".into(),
            page_url: "https://ark.wiki.gg/wiki/Test_Map".into(),
        }
    }

    fn names(records: &[RegionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    const TABLE_PAGE: &str = r#"<div class="mw-parser-output">
        <h2>Regions</h2>
        <table class="wikitable">
            <tr><th>Name</th><th>Description</th></tr>
            <tr><td>Redwood Valley</td><td>Tall trees</td></tr>
            <tr><td>Snow Peaks[1]</td><td>Cold</td></tr>
            <tr><td>Redwood Valley</td><td>Duplicate</td></tr>
        </table>
        <h2>Creatures</h2>
        <table><tr><th>Name</th></tr><tr><td>Rex</td></tr></table>
    </div>"#;

    const LIST_PAGE: &str = r#"<div class="mw-parser-output">
        <h2>Areas</h2>
        <ul><li>Crystal Wyvern Kingdom - Spire of crystal</li><li>Eastern Cliffs</li></ul>
    </div>"#;

    const SUBHEADING_PAGE: &str = r#"<div class="mw-parser-output">
        <div class="mw-heading mw-heading2"><h2>Regions</h2></div>
        <h3>Aberrant Trench</h3><p>A glowing trench.</p>
        <h3>Chalk Hills</h3><p>White cliffs.</p>
        <h2>Resources</h2><h3>Metal</h3>
    </div>"#;

    #[test]
    fn test_table_parser_reads_region_tables_only() {
        let doc = Html::parse_document(TABLE_PAGE);
        let found = TableRegionParser.parse(&doc, &ctx("lost-island"));
        assert_eq!(names(&found), vec!["Redwood Valley", "Snow Peaks"]);
        assert_eq!(found[0].description.as_deref(), Some("Tall trees"));
        assert_eq!(found[0].category, "forest");
        assert_eq!(found[1].category, "mountain");
    }

    #[test]
    fn test_list_parser_splits_descriptions() {
        let doc = Html::parse_document(LIST_PAGE);
        let found = ListRegionParser.parse(&doc, &ctx("crystal-isles"));
        assert_eq!(names(&found), vec!["Crystal Wyvern Kingdom", "Eastern Cliffs"]);
        assert_eq!(found[0].description.as_deref(), Some("Spire of crystal"));
        assert_eq!(found[1].description, None);
    }

    #[test]
    fn test_subheading_parser() {
        let doc = Html::parse_document(SUBHEADING_PAGE);
        let found = SubheadingRegionParser.parse(&doc, &ctx("valguero"));
        assert_eq!(names(&found), vec!["Aberrant Trench", "Chalk Hills"]);
        assert_eq!(found[1].description.as_deref(), Some("White cliffs."));
    }

    #[test]
    fn test_genesis_falls_back_to_known_biomes() {
        let doc = Html::parse_document("<div class=\"mw-parser-output\"><p>Nothing here</p></div>");
        let found = GenesisRegionParser::new(GENESIS_ONE_BIOMES).parse(&doc, &ctx("genesis-part-1"));
        assert_eq!(found.len(), GENESIS_ONE_BIOMES.len());
        assert_eq!(found[0].category, "swamp");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = RegionParserRegistry::default();
        assert_eq!(registry.parser_for("lost-island").name(), "table");
        assert_eq!(registry.parser_for("genesis-part-2").name(), "genesis");
        assert_eq!(registry.parser_for("the-island").name(), "generic");
    }

    #[test]
    fn test_generic_parser_tries_each_layout() {
        let registry = RegionParserRegistry::default();
        let found = registry.parse_page(LIST_PAGE, &ctx("the-island"));
        assert_eq!(found.len(), 2);
        let found = registry.parse_page(SUBHEADING_PAGE, &ctx("fjordur"));
        assert_eq!(names(&found), vec!["Aberrant Trench", "Chalk Hills"]);
    }
}
