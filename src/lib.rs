//! Marketplace listing scraper
//!
//! Turns marketplace pages into flat tables of records:
//! - Discovery of product pages through a web search provider
//! - Static HTTP fetches with retries, or rendered loads with lazy-load scrolling
//! - Declarative field rules (CSS selectors, label lookups, marker checks)
//! - Incremental CSV checkpoints after every page

pub mod config;
pub mod discovery;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod record;
pub mod render;
pub mod retry;
pub mod runner;
pub mod search;
pub mod store;
pub mod transport;

pub use error::*;
pub use record::{ExtractContext, Record, NOT_AVAILABLE};
