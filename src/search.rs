//! Search provider boundary and the SerpAPI client

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::SearchError;

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";

/// One page of a search: `num` results starting at offset `start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub engine: String,
    pub query: String,
    pub num: u32,
    pub start: u32,
}

/// A single organic result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub link: String,
}

pub trait SearchProvider {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: String,
}

/// Blocking SerpAPI client; the API key is attached to every request
pub struct SerpApiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, SearchError> {
        Self::with_endpoint(SERPAPI_ENDPOINT, api_key, timeout)
    }

    pub fn with_endpoint(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl SearchProvider for SerpApiClient {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        let num = query.num.to_string();
        let start = query.start.to_string();

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", query.engine.as_str()),
                ("q", query.query.as_str()),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
                ("start", start.as_str()),
            ])
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: api_error_message(&body).unwrap_or(body),
            });
        }

        parse_response(&body)
    }
}

/// Decode a SerpAPI body into hits
///
/// A body carrying `error` (e.g. "Google hasn't returned any results for
/// this query.") is an empty page, not a failure.
pub fn parse_response(body: &str) -> Result<Vec<SearchHit>, SearchError> {
    let response: SerpResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Request(format!("invalid search response: {e}")))?;

    if let Some(error) = response.error {
        debug!(error = %error, "Search returned no results");
    }

    Ok(response
        .organic_results
        .into_iter()
        .filter(|r| !r.link.is_empty())
        .map(|r| SearchHit { link: r.link })
        .collect())
}

fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<SerpResponse>(body).ok()?.error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organic_results() {
        let body = r#"{
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "LED Lights", "link": "https://www.tradeindia.com/led-lights.html"},
                {"position": 2, "title": "No link here"},
                {"position": 3, "link": "https://example.com/other"}
            ]
        }"#;

        let hits = parse_response(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://www.tradeindia.com/led-lights.html");
        assert_eq!(hits[1].link, "https://example.com/other");
    }

    #[test]
    fn test_parse_no_results_error() {
        let body = r#"{"error": "Google hasn't returned any results for this query."}"#;
        assert!(parse_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error": "Invalid API key."}"#).as_deref(),
            Some("Invalid API key.")
        );
        assert_eq!(api_error_message("not json"), None);
    }
}
