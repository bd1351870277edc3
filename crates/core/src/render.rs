//! Headless browser rendering for script-built pages.
//!
//! Some article pages ship an empty body container and fill it from
//! script. This module renders such pages through headless Chrome/Chromium
//! (chromiumoxide) behind the [`Renderer`] trait so the fetcher can be tested
//! without a browser.

use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::FolioError;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for the page or the wait selector.
    #[error("render timeout after {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for FolioError {
    fn from(err: RenderError) -> Self {
        FolioError::Render(err.to_string())
    }
}

/// Options for rendering a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Timeout in milliseconds (default: 30000).
    pub timeout_ms: u64,

    /// Optional CSS selector to wait for before reading content.
    pub wait_for: Option<String>,

    /// Pause after load when no selector is given (default: 2000).
    pub settle_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, wait_for: None, settle_ms: 2000 }
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Rendered HTML content.
    pub html: String,

    /// Final URL after redirects.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Renders a URL to its post-script markup.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}

/// Headless Chrome/Chromium renderer using chromiumoxide.
pub struct HeadlessRenderer {
    browser: chromiumoxide::Browser,
}

impl HeadlessRenderer {
    /// Launch a headless browser.
    ///
    /// Chrome DevTools Protocol events are drained by a background task for
    /// as long as the browser lives.
    pub async fn new() -> Result<Self, RenderError> {
        use chromiumoxide::browser::{Browser, BrowserConfig};
        use futures_util::StreamExt;

        let config = BrowserConfig::builder().build().map_err(RenderError::BrowserLaunch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser })
    }
}

#[async_trait::async_trait]
impl Renderer for HeadlessRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();
        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let timeout = Duration::from_millis(opts.timeout_ms);
        match &opts.wait_for {
            Some(selector) => {
                tokio::time::timeout(timeout, async {
                    while page.find_element(selector.as_str()).await.is_err() {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                })
                .await
                .map_err(|_| RenderError::Timeout(opts.timeout_ms))?;
            }
            None => {
                tokio::time::timeout(timeout, tokio::time::sleep(Duration::from_millis(opts.settle_ms)))
                    .await
                    .map_err(|_| RenderError::Timeout(opts.timeout_ms))?;
            }
        }

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let page_url = page
            .url()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let final_url = Url::parse(page_url.as_deref().unwrap_or(url.as_str()))
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let render_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %final_url, render_time_ms, bytes = html.len(), "rendered page");

        page.close().await.ok();
        Ok(RenderedPage { html, final_url, render_time_ms })
    }
}
