//! Scrapers - wiki and taming-site readers
//!
//! ```text
//! [WikiScraper / TamingSiteScraper]
//!       ↓ fetch(url)
//! [PageSource] ── HttpPageSource → [TtlCache] → reqwest
//!       ↓ html
//! [parsers] → *Record rows
//! ```

pub mod cache;
pub mod html;
pub mod normalize;
pub mod regions;
pub mod source;
pub mod taming_site;
pub mod wiki;

use std::sync::Arc;
use std::time::Duration;

pub use cache::TtlCache;
pub use regions::{RegionContext, RegionParser, RegionParserRegistry};
pub use source::{HttpPageSource, PageSource, ScrapeError};
pub use taming_site::TamingSiteScraper;
pub use wiki::{CreatureLink, ScrapedCreature, WikiScraper};

/// Wiki pages are cached for a day
pub const WIKI_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Taming pages are cached for twelve hours
pub const TAMING_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);
const PAGE_CACHE_CAPACITY: usize = 512;

/// Build both scrapers over HTTP, each with its own page cache
pub fn http_scrapers(
    wiki_base_url: &str,
    taming_base_url: &str,
    timeout: Duration,
) -> Result<(WikiScraper, TamingSiteScraper), ScrapeError> {
    let wiki_source = HttpPageSource::new(timeout, Arc::new(TtlCache::new(PAGE_CACHE_CAPACITY, WIKI_CACHE_TTL)))?;
    let taming_source = HttpPageSource::new(timeout, Arc::new(TtlCache::new(PAGE_CACHE_CAPACITY, TAMING_CACHE_TTL)))?;

    Ok((
        WikiScraper::new(Arc::new(wiki_source), wiki_base_url),
        TamingSiteScraper::new(Arc::new(taming_source), taming_base_url),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_scrapers_build_with_configured_client() {
        let (wiki, _taming) = http_scrapers("https://ark.wiki.gg/wiki/", "https://www.dododex.com/", Duration::from_secs(5))
            .expect("client should build");
        assert_eq!(wiki.page_url("Rex"), "https://ark.wiki.gg/wiki/Rex");
    }
}
