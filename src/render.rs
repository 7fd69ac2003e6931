//! Rendered page loading through a headless browser
//!
//! Marketplace category pages load more cards as the user scrolls. A
//! session scrolls to the bottom until the page height stops growing and
//! then hands the rendered source to the extractor. Sessions are opened
//! per URL and always closed before control returns to the caller.

use std::future::Future;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::RenderError;

const SCROLL_HEIGHT_JS: &str = "document.body ? document.body.scrollHeight : 0";
const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body ? document.body.scrollHeight : 0)";

/// One live browser page
pub trait BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError>;
    fn scroll_height(&mut self) -> Result<u64, RenderError>;
    fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;
    fn page_source(&mut self) -> Result<String, RenderError>;
    /// Release the session; calling it twice is harmless
    fn close(&mut self) -> Result<(), RenderError>;
}

/// Opens fresh sessions
pub trait BrowserLauncher {
    type Session: BrowserSession;

    fn launch(&self) -> Result<Self::Session, RenderError>;
}

/// Bounds for the lazy-load scroll loop
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Wait after each scroll for new content to arrive
    pub pause: Duration,
    pub max_scrolls: usize,
    /// Overall budget for scrolling one page
    pub deadline: Duration,
    /// Budget for any single browser command
    pub command_timeout: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(3),
            max_scrolls: 200,
            deadline: Duration::from_secs(180),
            command_timeout: Duration::from_secs(60),
        }
    }
}

/// Scroll until the page height stops increasing; returns the number of scrolls issued
///
/// Hitting `max_scrolls` or the deadline stops scrolling and keeps whatever
/// content has loaded.
pub fn scroll_to_end<S: BrowserSession + ?Sized>(
    session: &mut S,
    config: &ScrollConfig,
) -> Result<usize, RenderError> {
    let started = Instant::now();
    let mut last_height = session.scroll_height()?;
    let mut scrolls = 0;

    loop {
        if scrolls >= config.max_scrolls {
            warn!(scrolls, "Scroll limit reached, using content loaded so far");
            break;
        }
        if started.elapsed() >= config.deadline {
            warn!(scrolls, deadline = ?config.deadline, "Scroll deadline reached, using content loaded so far");
            break;
        }

        session.scroll_to_bottom()?;
        scrolls += 1;
        if !config.pause.is_zero() {
            thread::sleep(config.pause);
        }

        let new_height = session.scroll_height()?;
        debug!(scrolls, last_height, new_height, "Scrolled");
        if new_height <= last_height {
            break;
        }
        last_height = new_height;
    }

    Ok(scrolls)
}

/// Open a session, load and fully scroll `url`, return its source, close the session
pub fn render_page<L: BrowserLauncher>(
    launcher: &L,
    url: &str,
    config: &ScrollConfig,
) -> Result<String, RenderError> {
    let mut session = launcher.launch()?;

    let result = load_scrolled(&mut session, url, config);

    if let Err(e) = session.close() {
        warn!(url, error = %e, "Failed to close browser session");
    }

    result
}

fn load_scrolled<S: BrowserSession>(
    session: &mut S,
    url: &str,
    config: &ScrollConfig,
) -> Result<String, RenderError> {
    session.navigate(url)?;
    let scrolls = scroll_to_end(session, config)?;
    debug!(url, scrolls, "Page fully scrolled");
    session.page_source()
}

/// Launches headless Chrome over the DevTools protocol
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    pub command_timeout: Duration,
    /// Chrome binary; detected automatically when unset
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
}

impl ChromeLauncher {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            command_timeout: config.command_timeout,
            executable: None,
            no_sandbox: false,
        }
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, RenderError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(self.command_timeout)
            .arg("--disable-blink-features=AutomationControlled");
        if let Some(ref path) = self.executable {
            builder = builder.chrome_executable(path);
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(RenderError::Launch)?;

        let timeout = self.command_timeout;
        let (browser, mut handler) = runtime
            .block_on(async move { tokio::time::timeout(timeout, Browser::launch(config)).await })
            .map_err(|_| RenderError::Timeout(timeout))?
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the DevTools connection and must be polled continuously
        let handler_task = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let mut session = ChromeSession {
            runtime,
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
            command_timeout: timeout,
        };

        let page = {
            let browser = session
                .browser
                .as_ref()
                .ok_or_else(|| RenderError::Launch("browser not running".to_string()))?;
            session.run(browser.new_page("about:blank"))
        };
        match page {
            Ok(page) => {
                session.page = Some(page);
                Ok(session)
            }
            Err(e) => {
                let _ = session.close();
                Err(e)
            }
        }
    }
}

/// A Chrome process with a single page, driven from a private runtime
pub struct ChromeSession {
    runtime: Runtime,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    command_timeout: Duration,
}

impl ChromeSession {
    fn run<T, F>(&self, fut: F) -> Result<T, RenderError>
    where
        F: Future<Output = Result<T, CdpError>>,
    {
        let timeout = self.command_timeout;
        self.runtime
            .block_on(async move { tokio::time::timeout(timeout, fut).await })
            .map_err(|_| RenderError::Timeout(timeout))?
            .map_err(|e| RenderError::Browser(e.to_string()))
    }

    fn page(&self) -> Result<&Page, RenderError> {
        self.page
            .as_ref()
            .ok_or_else(|| RenderError::Browser("session already closed".to_string()))
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let page = self.page()?;
        self.run(async move {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok(())
        })
    }

    fn scroll_height(&mut self) -> Result<u64, RenderError> {
        let page = self.page()?;
        let result = self.run(page.evaluate(SCROLL_HEIGHT_JS))?;
        result
            .into_value::<u64>()
            .map_err(|e| RenderError::Browser(format!("unexpected scroll height: {e}")))
    }

    fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        let page = self.page()?;
        self.run(page.evaluate(SCROLL_TO_BOTTOM_JS)).map(|_| ())
    }

    fn page_source(&mut self) -> Result<String, RenderError> {
        let page = self.page()?;
        self.run(page.content())
    }

    fn close(&mut self) -> Result<(), RenderError> {
        // Page handles die with the browser
        self.page = None;

        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = self.run(browser.close()).map(|_| ());
                if closed.is_err() {
                    let _ = self
                        .runtime
                        .block_on(async { tokio::time::timeout(self.command_timeout, browser.kill()).await });
                }
                let timeout = self.command_timeout;
                let _ = self
                    .runtime
                    .block_on(async { tokio::time::timeout(timeout, browser.wait()).await });
                closed
            }
            None => Ok(()),
        };

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            let _ = self.close();
        }
    }
}
