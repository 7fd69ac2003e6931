//! Page fetch strategies: plain HTTP or rendered browser

use tracing::debug;

use crate::error::FetchError;
use crate::render::{render_page, BrowserLauncher, ScrollConfig};
use crate::transport::Transport;

/// Turns a URL into page HTML
pub trait PageFetcher {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError>;
}

/// HTTP GET through a (usually retrying) transport, requiring a 2xx status
pub struct StaticFetcher<T> {
    transport: T,
}

impl<T: Transport> StaticFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> PageFetcher for StaticFetcher<T> {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let response = self.transport.get(url)?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        debug!(url, bytes = response.body.len(), "Fetched page");
        Ok(response.body)
    }
}

/// Headless browser load with lazy-load scrolling, one session per URL
pub struct RenderedFetcher<L> {
    launcher: L,
    scroll: ScrollConfig,
}

impl<L: BrowserLauncher> RenderedFetcher<L> {
    pub fn new(launcher: L, scroll: ScrollConfig) -> Self {
        Self { launcher, scroll }
    }
}

impl<L: BrowserLauncher> PageFetcher for RenderedFetcher<L> {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let html = render_page(&self.launcher, url, &self.scroll)?;
        debug!(url, bytes = html.len(), "Rendered page");
        Ok(html)
    }
}
