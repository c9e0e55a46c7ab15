//! Taming-calculator site scraper
//!
//! Taming pages are read as flat text and mined with patterns. Every field
//! has a default, so a thin page still yields a usable row; only a failed
//! fetch loses the creature's taming data.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use scraper::{Html, Node};

use super::source::{PageSource, ScrapeError};
use crate::models::TamingRecord;

pub const DEFAULT_TAMING_BASE_URL: &str = "https://www.dododex.com/taming/";

const DEFAULT_FOOD_QUANTITY: i32 = 10;
const DEFAULT_TAMING_MINUTES: f64 = 30.0;

/// Foods recognised on taming pages
const KNOWN_FOODS: &[&str] = &[
    "Kibble",
    "Raw Mutton",
    "Cooked Lamb Chop",
    "Raw Prime Fish Meat",
    "Raw Prime Meat",
    "Raw Fish Meat",
    "Raw Meat",
    "Cooked Meat",
    "Mejoberry",
    "Crops",
    "Vegetables",
    "Berries",
    "Spoiled Meat",
];

pub struct TamingSiteScraper {
    source: Arc<dyn PageSource>,
    base_url: String,
}

impl TamingSiteScraper {
    pub fn new(source: Arc<dyn PageSource>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { source, base_url }
    }

    pub async fn taming(&self, creature_slug: &str) -> Result<TamingRecord, ScrapeError> {
        let url = format!("{}{}", self.base_url, creature_slug);
        let page = self.source.fetch(&url).await?;
        Ok(parse_taming_page(&page))
    }
}

/// Visible text of the page, skipping scripts and styles
fn page_text(page: &str) -> String {
    let doc = Html::parse_document(page);
    let mut out = String::new();
    for node in doc.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
            .is_some_and(|name| name == "script" || name == "style");
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("taming pattern"))
}

fn kibble_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)\b(basic|simple|regular|superior|exceptional|extraordinary) kibble")
}

fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(\d+)\s*[x×]\s*[A-Z]")
}

fn hms_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?:(\d+)\s*h)?\s*(\d+)\s*m(?:in)?\b")
}

fn torpor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)torpor[^0-9]{0,24}([\d,]+(?:\.\d+)?)")
}

fn depletion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)(\d+(?:\.\d+)?)\s*/\s*s(?:ec)?\b")
}

fn number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn taming_method(lower: &str) -> &'static str {
    if lower.contains("passive tam") || lower.contains("passively tame") {
        "passive"
    } else if lower.contains("knock out") || lower.contains("knockout") || lower.contains("knocked out") {
        "knockout"
    } else if lower.contains("special tam") || lower.contains("cannot be tamed conventionally") {
        "special"
    } else {
        "knockout"
    }
}

/// Known foods in order of first appearance; a default carnivore list otherwise.
/// A longer name claims its span so a shorter name inside it is not counted.
fn preferred_foods(text: &str) -> Vec<String> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut found: Vec<(usize, &str)> = Vec::new();

    for food in KNOWN_FOODS {
        let mut first = None;
        for (start, _) in text.match_indices(food) {
            let end = start + food.len();
            if claimed.iter().any(|(s, e)| start < *e && end > *s) {
                continue;
            }
            claimed.push((start, end));
            first.get_or_insert(start);
        }
        if let Some(pos) = first {
            found.push((pos, *food));
        }
    }

    if found.is_empty() {
        return vec!["Kibble".into(), "Raw Mutton".into(), "Raw Prime Meat".into(), "Raw Meat".into()];
    }
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, food)| food.to_string()).collect()
}

fn taming_minutes(text: &str) -> Option<f64> {
    let caps = hms_re().captures(text)?;
    let hours = caps.get(1).and_then(|m| number(m.as_str())).unwrap_or(0.0);
    let minutes = caps.get(2).and_then(|m| number(m.as_str()))?;
    Some(hours * 60.0 + minutes)
}

pub fn parse_taming_page(page: &str) -> TamingRecord {
    let text = page_text(page);
    let lower = text.to_lowercase();

    let base_food_quantity = quantity_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_FOOD_QUANTITY);
    let base_taming_time = taming_minutes(&text).unwrap_or(DEFAULT_TAMING_MINUTES);
    let base_torpor = torpor_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| number(m.as_str()));
    let torpor_depletion_rate = depletion_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| number(m.as_str()));

    TamingRecord {
        method: taming_method(&lower).to_string(),
        preferred_foods: preferred_foods(&text),
        kibble_type: kibble_re().find(&text).map(|m| m.as_str().to_string()),
        base_food_quantity,
        base_taming_time,
        torpor_depletion_rate,
        base_torpor,
        feeding_interval: Some(base_taming_time * 60.0 / base_food_quantity.max(1) as f64),
    }
}
