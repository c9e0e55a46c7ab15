//! Text normalization for scraped values

use std::sync::OnceLock;

use regex::Regex;

/// "Genesis: Part 1" -> "genesis-part-1"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("number regex"))
}

/// First number in `text`, ignoring thousands separators ("1,100 (+220)" -> 1100)
pub fn parse_number(text: &str) -> Option<f64> {
    number_re()
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// All numbers in `text`, in order
pub fn parse_numbers(text: &str) -> Vec<f64> {
    number_re()
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse().ok())
        .collect()
}

pub fn parse_yes_no(text: &str) -> Option<bool> {
    let lower = text.trim().to_lowercase();
    if lower.starts_with("yes") || lower == "true" || lower.starts_with('✔') {
        Some(true)
    } else if lower.starts_with("no") || lower == "false" || lower.starts_with('✘') || lower.starts_with('✖') {
        Some(false)
    } else {
        None
    }
}

/// Keyword groups checked in order; the first hit wins
const REGION_CATEGORIES: &[(&str, &[&str])] = &[
    ("cave", &["cave", "cavern", "grotto", "tunnel", "trench", "chamber", "dungeon", "labyrinth"]),
    ("water", &["lake", "river", "ocean", "sea", "lagoon", "oasis", "waterfall", "bay", "reef"]),
    ("coast", &["beach", "coast", "shore", "islet", "island", "cove", "cliffs"]),
    ("mountain", &["mountain", "peak", "hill", "highland", "plateau", "ridge", "spire", "canyon"]),
    ("volcanic", &["volcano", "volcanic", "lava", "magma", "ash"]),
    ("snow", &["snow", "ice", "frozen", "tundra", "glacier", "arctic", "frost", "jotunheim"]),
    ("desert", &["desert", "dune", "sand", "wasteland", "badlands", "canyon"]),
    ("swamp", &["swamp", "bog", "marsh", "mire", "wetland"]),
    ("forest", &["forest", "wood", "jungle", "grove", "redwood", "rainforest", "fertile"]),
    ("grassland", &["plain", "grass", "meadow", "field", "valley", "steppe", "savanna"]),
];

/// Derive a region category from its name
pub fn categorize_region(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    REGION_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or("other")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Genesis: Part 1"), "genesis-part-1");
        assert_eq!(slugify("  Tek Rex!! "), "tek-rex");
        assert_eq!(slugify("Crystal Isles"), "crystal-isles");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,100 (+220)"), Some(1100.0));
        assert_eq!(parse_number("Speed: 12.5%"), Some(12.5));
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_numbers("1100 +220 +5.4%"), vec![1100.0, 220.0, 5.4]);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Yes"), Some(true));
        assert_eq!(parse_yes_no(" no (see notes)"), Some(false));
        assert_eq!(parse_yes_no("Sometimes"), None);
    }

    #[test]
    fn test_categorize_region() {
        assert_eq!(categorize_region("Central Cave"), "cave");
        assert_eq!(categorize_region("Hidden Lake"), "water");
        assert_eq!(categorize_region("Southern Islets"), "coast");
        assert_eq!(categorize_region("Volcano"), "volcanic");
        assert_eq!(categorize_region("Redwood Forest"), "forest");
        assert_eq!(categorize_region("The Dunes"), "desert");
        assert_eq!(categorize_region("Bog"), "swamp");
        assert_eq!(categorize_region("Nowhere In Particular"), "other");
    }
}
