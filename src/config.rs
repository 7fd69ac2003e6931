//! Runtime configuration read from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::discovery::DiscoveryConfig;
use crate::render::ScrollConfig;
use crate::retry::RetryPolicy;
use crate::transport::HttpConfig;

/// Scraper configuration with defaults overridable from the environment
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// SerpAPI credential; only the discovery pipeline needs it
    pub api_key: Option<String>,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    pub discovery: DiscoveryConfig,
    pub scroll: ScrollConfig,
    /// Wait after every product page in the discovery pipeline
    pub page_delay: Duration,
    pub chrome_executable: Option<PathBuf>,
    pub chrome_no_sandbox: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
            discovery: DiscoveryConfig::default(),
            scroll: ScrollConfig::default(),
            page_delay: Duration::from_secs(2),
            chrome_executable: None,
            chrome_no_sandbox: false,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup
    ///
    /// Recognised keys: `API_KEY`, `HTTP_TIMEOUT_SECS`, `PAGE_DELAY_SECS`,
    /// `SEARCH_PACING_SECS`, `SCROLL_PAUSE_SECS`, `CHROME_EXECUTABLE` and
    /// `CHROME_NO_SANDBOX`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = lookup("API_KEY").filter(|key| !key.trim().is_empty());

        if let Some(secs) = seconds(&lookup, "HTTP_TIMEOUT_SECS")? {
            config.http.timeout = secs;
        }
        if let Some(secs) = seconds(&lookup, "PAGE_DELAY_SECS")? {
            config.page_delay = secs;
        }
        if let Some(secs) = seconds(&lookup, "SEARCH_PACING_SECS")? {
            config.discovery.pacing = secs;
        }
        if let Some(secs) = seconds(&lookup, "SCROLL_PAUSE_SECS")? {
            config.scroll.pause = secs;
        }

        config.chrome_executable = lookup("CHROME_EXECUTABLE").map(PathBuf::from);
        config.chrome_no_sandbox = match lookup("CHROME_NO_SANDBOX") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("CHROME_NO_SANDBOX must be true or false, got {value:?}"))?,
            None => false,
        };

        Ok(config)
    }

    /// The SerpAPI credential, or an error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("API_KEY must be set to search for product pages")
    }
}

fn seconds<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .with_context(|| format!("{key} must be a non-negative number of seconds, got {raw:?}"))
        })
        .transpose()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api_key, None);
        assert_eq!(config.http.timeout, Duration::from_secs(10));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.discovery.keywords.len(), 7);
        assert_eq!(config.discovery.pacing, Duration::from_secs(1));
        assert_eq!(config.scroll.pause, Duration::from_secs(3));
        assert_eq!(config.page_delay, Duration::from_secs(2));
        assert!(!config.chrome_no_sandbox);
    }

    #[test]
    fn test_overrides() {
        let config = ScraperConfig::from_lookup(lookup(&[
            ("API_KEY", "secret"),
            ("HTTP_TIMEOUT_SECS", "30"),
            ("PAGE_DELAY_SECS", "0.5"),
            ("CHROME_EXECUTABLE", "/usr/bin/chromium"),
            ("CHROME_NO_SANDBOX", "true"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.page_delay, Duration::from_millis(500));
        assert_eq!(config.chrome_executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(config.chrome_no_sandbox);
    }

    #[test]
    fn test_missing_api_key() {
        let config = ScraperConfig::from_lookup(lookup(&[("API_KEY", "  ")])).unwrap();

        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_invalid_number() {
        let err = ScraperConfig::from_lookup(lookup(&[("PAGE_DELAY_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("PAGE_DELAY_SECS"));
    }
}
