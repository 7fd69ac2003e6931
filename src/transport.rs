//! Blocking HTTP transport for static page fetches

use std::time::Duration;

use crate::error::FetchError;

/// Default user agent sent with page requests
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A GET-only transport. Any status is a successful round trip; only
/// transport-level failures are errors.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Timeout, identity and body cap for page requests
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Largest response body read, in bytes; unlimited by default
    pub max_body_bytes: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_bytes: u64::MAX,
        }
    }
}

/// Transport backed by a ureq agent (simple blocking HTTP, certificate verification on)
pub struct UreqTransport {
    agent: ureq::Agent,
    max_body_bytes: u64,
}

impl UreqTransport {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(config.timeout))
                .user_agent(config.user_agent.as_str())
                // Statuses are inspected by the retry layer and the fetcher
                .http_status_as_error(false)
                .build(),
        );

        Self {
            agent,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_string()
            .map_err(|e| match classify_error(url, e) {
                FetchError::Network { url, message } => FetchError::Body { url, message },
                other => other,
            })?;

        Ok(HttpResponse { status, body })
    }
}

fn classify_error(url: &str, err: ureq::Error) -> FetchError {
    let url = url.to_string();
    match err {
        ureq::Error::Timeout(_) => FetchError::Timeout { url },
        ureq::Error::Tls(_) | ureq::Error::Rustls(_) => FetchError::Tls {
            url,
            message: err.to_string(),
        },
        other => FetchError::Network {
            url,
            message: other.to_string(),
        },
    }
}
