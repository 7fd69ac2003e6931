//! Keyword-driven discovery of marketplace product URLs

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::search::{SearchProvider, SearchQuery};

/// Results requested per search page
pub const PAGE_SIZE: u32 = 10;
/// Highest result offset (exclusive) requested per keyword
pub const MAX_RESULTS: u32 = 100;

/// Topic keywords searched when none are given
pub const DEFAULT_KEYWORDS: [&str; 7] = [
    "automotive",
    "lighting",
    "construction",
    "agriculture",
    "oil & gas",
    "renewable energy",
    "heavy machinery",
];

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Marketplace domain; only links containing it are kept
    pub domain: String,
    pub engine: String,
    /// Wait after every productive search page
    pub pacing: Duration,
    pub keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain: "tradeindia.com".to_string(),
            engine: "google".to_string(),
            pacing: Duration::from_secs(1),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Search page for `keyword` at result offset `start`
pub fn build_query(keyword: &str, config: &DiscoveryConfig, start: u32) -> SearchQuery {
    SearchQuery {
        engine: config.engine.clone(),
        query: format!("{} site:{}", keyword, config.domain),
        num: PAGE_SIZE,
        start,
    }
}

/// Page through search results for one keyword, collecting marketplace links
///
/// Stops at the first page without a marketplace link or at `MAX_RESULTS`.
/// A provider error ends this keyword's pagination with what was gathered.
/// Links are not deduplicated across pages.
pub fn discover_links<P: SearchProvider + ?Sized>(
    provider: &P,
    keyword: &str,
    config: &DiscoveryConfig,
) -> Vec<String> {
    info!(keyword, "Searching for products");
    let mut links = Vec::new();

    for start in (0..MAX_RESULTS).step_by(PAGE_SIZE as usize) {
        let query = build_query(keyword, config, start);

        let hits = match provider.search(&query) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(keyword, start, error = %e, "Search failed, stopping pagination");
                break;
            }
        };

        let page_links: Vec<String> = hits
            .into_iter()
            .map(|hit| hit.link)
            .filter(|link| link.contains(&config.domain))
            .collect();

        if page_links.is_empty() {
            info!(keyword, page = start / PAGE_SIZE + 1, "No more marketplace links");
            break;
        }

        links.extend(page_links);

        if !config.pacing.is_zero() {
            thread::sleep(config.pacing);
        }
    }

    info!(keyword, count = links.len(), "Discovered product links");
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::SearchHit;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeProvider {
        pages: HashMap<u32, Vec<&'static str>>,
        failing: Option<u32>,
        queries: RefCell<Vec<SearchQuery>>,
    }

    impl FakeProvider {
        fn new(pages: &[(u32, Vec<&'static str>)]) -> Self {
            Self {
                pages: pages.iter().cloned().collect(),
                failing: None,
                queries: RefCell::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<u32> {
            self.queries.borrow().iter().map(|q| q.start).collect()
        }
    }

    impl SearchProvider for FakeProvider {
        fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
            self.queries.borrow_mut().push(query.clone());
            if self.failing == Some(query.start) {
                return Err(SearchError::Api {
                    status: 429,
                    message: "rate limited".to_string(),
                });
            }
            Ok(self
                .pages
                .get(&query.start)
                .map(|links| {
                    links
                        .iter()
                        .map(|link| SearchHit {
                            link: link.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn instant_config() -> DiscoveryConfig {
        DiscoveryConfig {
            pacing: Duration::ZERO,
            ..DiscoveryConfig::default()
        }
    }

    #[test]
    fn test_stops_at_first_empty_page() {
        let provider = FakeProvider::new(&[
            (0, vec!["https://www.tradeindia.com/a.html", "https://www.tradeindia.com/b.html"]),
            (10, vec!["https://www.tradeindia.com/c.html"]),
            (30, vec!["https://www.tradeindia.com/never.html"]),
        ]);

        let links = discover_links(&provider, "lighting", &instant_config());
        assert_eq!(provider.offsets(), vec![0, 10, 20]);
        assert_eq!(
            links,
            vec![
                "https://www.tradeindia.com/a.html",
                "https://www.tradeindia.com/b.html",
                "https://www.tradeindia.com/c.html",
            ]
        );
    }

    #[test]
    fn test_foreign_links_filtered_and_count_as_empty() {
        let provider = FakeProvider::new(&[
            (0, vec!["https://www.tradeindia.com/a.html", "https://www.indiamart.com/x.html"]),
            (10, vec!["https://www.indiamart.com/y.html"]),
        ]);

        let links = discover_links(&provider, "lighting", &instant_config());
        assert_eq!(links, vec!["https://www.tradeindia.com/a.html"]);
        assert_eq!(provider.offsets(), vec![0, 10]);
    }

    #[test]
    fn test_pagination_capped_at_max_results() {
        let pages: Vec<(u32, Vec<&'static str>)> = (0..20)
            .map(|i| (i * PAGE_SIZE, vec!["https://www.tradeindia.com/p.html"]))
            .collect();
        let provider = FakeProvider::new(&pages);

        let links = discover_links(&provider, "automotive", &instant_config());
        assert_eq!(provider.offsets(), (0..10).map(|i| i * PAGE_SIZE).collect::<Vec<_>>());
        assert_eq!(links.len(), 10);
    }

    #[test]
    fn test_provider_error_keeps_gathered_links() {
        let mut provider = FakeProvider::new(&[
            (0, vec!["https://www.tradeindia.com/a.html"]),
            (10, vec!["https://www.tradeindia.com/b.html"]),
        ]);
        provider.failing = Some(10);

        let links = discover_links(&provider, "construction", &instant_config());
        assert_eq!(links, vec!["https://www.tradeindia.com/a.html"]);
        assert_eq!(provider.offsets(), vec![0, 10]);
    }

    #[test]
    fn test_query_shape() {
        let query = build_query("oil & gas", &DiscoveryConfig::default(), 20);
        assert_eq!(query.engine, "google");
        assert_eq!(query.query, "oil & gas site:tradeindia.com");
        assert_eq!(query.num, 10);
        assert_eq!(query.start, 20);
    }
}
