//! HTML helpers shared by the parsers
//!
//! Wiki pages put their content under `.mw-parser-output`, with headings
//! either bare (`<h2>`) or wrapped in `<div class="mw-heading">`. The
//! section walker flattens both layouts into titled runs of sibling
//! elements.
//!
//! `scraper::Html` is not `Send`; parse and drop it inside synchronous
//! functions, never across an `.await`.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::source::ScrapeError;

pub fn sel(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("selector {:?}: {}", css, e)))
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(?:edit|\d+|citation needed)\]").expect("marker regex"))
}

/// Strip `[edit]`/`[n]` markers and collapse whitespace
pub fn clean_text(raw: &str) -> String {
    let stripped = marker_re().replace_all(raw, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn first_link(el: ElementRef<'_>) -> Option<String> {
    let a = sel("a[href]").ok()?;
    el.select(&a)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(String::from)
}

pub fn first_image(el: ElementRef<'_>) -> Option<String> {
    let img = sel("img[src]").ok()?;
    el.select(&img)
        .next()
        .and_then(|i| i.value().attr("src"))
        .map(String::from)
}

/// Resolve a wiki-relative href against the site origin
pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let origin = base
        .find("://")
        .and_then(|scheme| base[scheme + 3..].find('/').map(|p| &base[..scheme + 3 + p]))
        .unwrap_or(base.trim_end_matches('/'));
    format!("{}/{}", origin, href.trim_start_matches('/'))
}

// ============================================================================
// Sections
// ============================================================================

pub struct Section<'a> {
    pub title: String,
    pub level: u8,
    pub nodes: Vec<ElementRef<'a>>,
}

impl<'a> Section<'a> {
    pub fn title_matches(&self, keywords: &[&str]) -> bool {
        let title = self.title.to_lowercase();
        keywords.iter().any(|k| title.contains(k))
    }

    /// Descendants of this section's nodes matching `selector`, including
    /// the nodes themselves
    pub fn select(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if selector.matches(node) {
                out.push(*node);
            }
            out.extend(node.select(selector));
        }
        out
    }
}

fn heading_level(el: ElementRef<'_>) -> Option<u8> {
    match el.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// The heading carried by `el`, bare or inside a `mw-heading` wrapper
fn heading_of(el: ElementRef<'_>) -> Option<(u8, String)> {
    if let Some(level) = heading_level(el) {
        return Some((level, element_text(el)));
    }
    if is_tag(el, "div") && has_class(el, "mw-heading") {
        return el
            .children()
            .filter_map(ElementRef::wrap)
            .find_map(|h| heading_level(h).map(|level| (level, element_text(h))));
    }
    None
}

/// Split the article body into sections at every heading
pub fn sections(doc: &Html) -> Vec<Section<'_>> {
    let root = sel(".mw-parser-output")
        .ok()
        .and_then(|s| doc.select(&s).next())
        .or_else(|| sel("body").ok().and_then(|s| doc.select(&s).next()))
        .unwrap_or_else(|| doc.root_element());

    let mut out = vec![Section {
        title: String::new(),
        level: 1,
        nodes: Vec::new(),
    }];

    for child in root.children().filter_map(ElementRef::wrap) {
        match heading_of(child) {
            Some((level, title)) => out.push(Section {
                title,
                level,
                nodes: Vec::new(),
            }),
            None => {
                if let Some(current) = out.last_mut() {
                    current.nodes.push(child);
                }
            }
        }
    }

    out
}

/// Sections whose title matches, plus the sub-sections nested under them
pub fn sections_under<'s, 'a>(all: &'s [Section<'a>], keywords: &[&str]) -> Vec<&'s Section<'a>> {
    let mut out = Vec::new();
    let mut parent_level: Option<u8> = None;

    for section in all {
        if let Some(level) = parent_level {
            if section.level > level {
                out.push(section);
                continue;
            }
            parent_level = None;
        }
        if section.title_matches(keywords) {
            parent_level = Some(section.level);
            out.push(section);
        }
    }

    out
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, keywords: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            let h = h.to_lowercase();
            keywords.iter().any(|k| h.contains(k))
        })
    }
}

/// Flatten a `<table>` into header labels and text rows
pub fn parse_table(table: ElementRef<'_>) -> Table {
    let mut parsed = Table::default();
    let (Ok(tr), Ok(cell)) = (sel("tr"), sel("th, td")) else {
        return parsed;
    };

    for row in table.select(&tr) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell).collect();
        if cells.is_empty() {
            continue;
        }
        let all_header = cells.iter().all(|c| is_tag(*c, "th"));
        let texts: Vec<String> = cells.iter().map(|c| element_text(*c)).collect();
        if all_header && parsed.headers.is_empty() {
            parsed.headers = texts;
        } else if !all_header {
            parsed.rows.push(texts);
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_markers() {
        assert_eq!(clean_text("  Central\n Cave[edit] [3] "), "Central Cave");
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("https://ark.wiki.gg/wiki/", "/wiki/Rex"), "https://ark.wiki.gg/wiki/Rex");
        assert_eq!(absolute_url("https://ark.wiki.gg/wiki/", "//cdn.x/y.png"), "https://cdn.x/y.png");
        assert_eq!(absolute_url("https://a.b/", "https://c.d/e"), "https://c.d/e");
    }

    #[test]
    fn test_sections_handle_wrapped_headings() {
        let doc = Html::parse_document(
            r#"<div class="mw-parser-output">
                <p>Intro</p>
                <div class="mw-heading mw-heading2"><h2>Caves</h2><span>[edit]</span></div>
                <ul><li>Central Cave</li></ul>
                <h3>Underwater</h3>
                <p>Deep</p>
                <h2>Resources</h2>
                <p>Metal</p>
            </div>"#,
        );
        let all = sections(&doc);
        let titles: Vec<&str> = all.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["", "Caves", "Underwater", "Resources"]);

        let caves = sections_under(&all, &["cave"]);
        assert_eq!(caves.len(), 2);
        assert_eq!(caves[1].title, "Underwater");
    }

    #[test]
    fn test_parse_table() {
        let doc = Html::parse_fragment(
            "<table><tr><th>Name</th><th>Biome</th></tr><tr><td>Redwood[1]</td><td>Forest</td></tr></table>",
        );
        let table = doc.select(&sel("table").unwrap()).next().unwrap();
        let parsed = parse_table(table);
        assert_eq!(parsed.headers, vec!["Name", "Biome"]);
        assert_eq!(parsed.rows, vec![vec!["Redwood".to_string(), "Forest".to_string()]]);
        assert_eq!(parsed.column(&["biome"]), Some(1));
    }
}
