//! Run control: one owner for the growing record table
//!
//! Every URL is fetched, parsed and appended before the next begins, and
//! the full table is persisted after each URL whether or not it succeeded.

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::discovery::{discover_links, DiscoveryConfig};
use crate::error::{FetchError, StoreError};
use crate::extractors::RecordSchema;
use crate::fetcher::PageFetcher;
use crate::record::{ExtractContext, Record};
use crate::search::SearchProvider;
use crate::store::RecordSink;

/// Totals reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub records: usize,
}

/// Holds the accumulated records and checkpoints them after every URL
pub struct RunController<S> {
    sink: S,
    records: Vec<Record>,
    summary: RunSummary,
}

impl<S: RecordSink> RunController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            records: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    /// Run one unit of work for `url`, append its records, then persist the table
    ///
    /// A page-level failure is logged and skipped. Only persistence errors
    /// abort the run.
    pub fn process<F>(&mut self, url: &str, work: F) -> Result<(), StoreError>
    where
        F: FnOnce(&str) -> Result<Vec<Record>, FetchError>,
    {
        match work(url) {
            Ok(records) => {
                info!(url, records = records.len(), "Page scraped");
                self.summary.pages_ok += 1;
                self.records.extend(records);
            }
            Err(e) => {
                warn!(url, error = %e, "Skipping page");
                self.summary.pages_failed += 1;
            }
        }

        self.sink.persist(&self.records)
    }

    pub fn finish(mut self) -> RunSummary {
        self.summary.records = self.records.len();
        self.summary
    }
}

/// Fetch one page and extract every record the schema finds in it
pub fn scrape_page<F: PageFetcher + ?Sized>(
    fetcher: &mut F,
    schema: &RecordSchema,
    url: &str,
    ctx: &ExtractContext,
) -> Result<Vec<Record>, FetchError> {
    let html = fetcher.fetch(url)?;
    Ok(schema.extract_records(&html, ctx))
}

/// Scrape a fixed list of listing pages
pub fn run_listing_pages<F, S>(
    urls: &[String],
    fetcher: &mut F,
    schema: &RecordSchema,
    sink: S,
) -> Result<RunSummary, StoreError>
where
    F: PageFetcher + ?Sized,
    S: RecordSink,
{
    let mut run = RunController::new(sink);
    let total = urls.len();

    for (index, url) in urls.iter().enumerate() {
        info!(url, position = index + 1, total, "Scraping");
        let ctx = ExtractContext::new().with(ExtractContext::URL, url.as_str());
        run.process(url, |url| scrape_page(fetcher, schema, url, &ctx))?;
    }

    Ok(run.finish())
}

/// Discover product pages per keyword, then scrape each one
///
/// `page_delay` is waited after every product page to avoid being blocked.
pub fn run_discovery<P, F, S>(
    provider: &P,
    fetcher: &mut F,
    schema: &RecordSchema,
    config: &DiscoveryConfig,
    page_delay: Duration,
    sink: S,
) -> Result<RunSummary, StoreError>
where
    P: SearchProvider + ?Sized,
    F: PageFetcher + ?Sized,
    S: RecordSink,
{
    let mut run = RunController::new(sink);

    for keyword in &config.keywords {
        let links = discover_links(provider, keyword, config);

        for link in &links {
            let ctx = ExtractContext::new()
                .with(ExtractContext::URL, link.as_str())
                .with(ExtractContext::KEYWORD, keyword.as_str());
            run.process(link, |url| scrape_page(fetcher, schema, url, &ctx))?;

            if !page_delay.is_zero() {
                thread::sleep(page_delay);
            }
        }
    }

    Ok(run.finish())
}
