//! Content fetching from URLs, files, and stdin.
//!
//! [`fetch_url`] is a plain HTTP GET. [`fetch_article`] adds the article
//! policy: a page whose markup lacks every known body container marker is
//! retried through a headless browser when the `render` feature is enabled.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, header};
use url::Url;

use crate::{FolioError, Result};

#[cfg(feature = "render")]
use crate::render::{HeadlessRenderer, RenderOptions, Renderer};

/// Browser-like User-Agent sent by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client configuration for fetching article pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Optional `Referer` header.
    pub referer: Option<String>,
    /// Substrings whose presence marks the plain response as usable.
    /// An empty list accepts every response.
    pub content_markers: Vec<String>,
    /// Whether to retry through a headless browser when markers are missing.
    pub render: bool,
    /// CSS selector the headless browser waits for.
    pub wait_for: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
            content_markers: vec!["rich_media_content".to_string(), "js_content".to_string()],
            render: true,
            wait_for: "div.rich_media_content, div#js_content".to_string(),
        }
    }
}

impl FetchConfig {
    /// Whether `html` carries one of the content markers.
    pub fn has_content_marker(&self, html: &str) -> bool {
        self.content_markers.is_empty() || self.content_markers.iter().any(|marker| html.contains(marker.as_str()))
    }
}

/// Fetches HTML content from a URL.
///
/// Follows redirects, respects the configured timeout and sends browser-like
/// headers.
///
/// # Errors
///
/// - [`FolioError::InvalidUrl`] for unparsable or non-HTTP URLs.
/// - [`FolioError::HttpStatus`] for non-success responses.
/// - [`FolioError::Timeout`] when the request exceeds the timeout.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| FolioError::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(FolioError::InvalidUrl("URL must use http:// or https://".to_string()));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .user_agent(&config.user_agent)
        .build()
        .map_err(FolioError::HttpError)?;

    let mut request = client
        .get(parsed_url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header(header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8");
    if let Some(referer) = &config.referer {
        request = request.header(header::REFERER, referer);
    }

    let response = request.send().await.map_err(|e| timeout_or_http(e, config.timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FolioError::HttpStatus { status: status.as_u16(), url: url.to_string() });
    }

    let content = response.text().await.map_err(|e| timeout_or_http(e, config.timeout))?;
    tracing::debug!(url, bytes = content.len(), "fetched page");

    Ok(content)
}

fn timeout_or_http(err: reqwest::Error, timeout: u64) -> FolioError {
    if err.is_timeout() { FolioError::Timeout { timeout } } else { FolioError::HttpError(err) }
}

/// Fetches an article page, falling back to headless rendering.
///
/// The plain response is accepted when it carries a content marker. Otherwise,
/// with rendering enabled, the page is rendered in a headless browser; if that
/// fails too, the plain body is returned when there is one, else the original
/// error.
pub async fn fetch_article(url: &str, config: &FetchConfig) -> Result<String> {
    let plain = fetch_url(url, config).await;
    if let Ok(html) = &plain
        && config.has_content_marker(html)
    {
        return plain;
    }

    render_fallback(url, config, plain).await
}

#[cfg(feature = "render")]
async fn render_fallback(url: &str, config: &FetchConfig, plain: Result<String>) -> Result<String> {
    if !config.render {
        return plain;
    }

    tracing::info!(url, "content markers missing, rendering with headless browser");
    let rendered = match HeadlessRenderer::new().await {
        Ok(renderer) => render_page(&renderer, url, config).await,
        Err(e) => Err(e.into()),
    };
    prefer_rendered(plain, rendered)
}

#[cfg(not(feature = "render"))]
async fn render_fallback(url: &str, _config: &FetchConfig, plain: Result<String>) -> Result<String> {
    tracing::warn!(url, "content markers missing and headless rendering is not compiled in");
    plain
}

/// Like [`fetch_article`] with a caller-supplied renderer.
#[cfg(feature = "render")]
pub async fn fetch_article_with_renderer(url: &str, config: &FetchConfig, renderer: &dyn Renderer) -> Result<String> {
    let plain = fetch_url(url, config).await;
    if let Ok(html) = &plain
        && config.has_content_marker(html)
    {
        return plain;
    }
    if !config.render {
        return plain;
    }

    prefer_rendered(plain, render_page(renderer, url, config).await)
}

#[cfg(feature = "render")]
async fn render_page(renderer: &dyn Renderer, url: &str, config: &FetchConfig) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| FolioError::InvalidUrl(format!("{}: {}", url, e)))?;
    let opts = RenderOptions {
        timeout_ms: config.timeout.saturating_mul(1000),
        wait_for: Some(config.wait_for.clone()),
        ..Default::default()
    };
    let page = renderer.render(&parsed, &opts).await?;
    Ok(page.html)
}

#[cfg(feature = "render")]
fn prefer_rendered(plain: Result<String>, rendered: Result<String>) -> Result<String> {
    match rendered {
        Ok(html) => Ok(html),
        Err(e) => {
            tracing::warn!(error = %e, "headless rendering failed, keeping plain response");
            plain
        }
    }
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(FolioError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(FolioError::from)
    }
}

/// Reads HTML content from standard input.
///
/// This function reads all available input from stdin until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(FolioError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE: &str = r#"<html><body><div id="js_content"><p>Body</p></div></body></html>"#;
    const SHELL: &str = r#"<html><body><div id="app"></div></body></html>"#;

    fn plain_config() -> FetchConfig {
        FetchConfig { render: false, ..Default::default() }
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("Mozilla"));
        assert!(config.render);
    }

    #[test]
    fn test_content_markers() {
        let config = FetchConfig::default();
        assert!(config.has_content_marker(ARTICLE));
        assert!(!config.has_content_marker(SHELL));

        let open = FetchConfig { content_markers: Vec::new(), ..Default::default() };
        assert!(open.has_content_marker(SHELL));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let result = fetch_url("not-a-url", &plain_config()).await;
        assert!(matches!(result, Err(FolioError::InvalidUrl(_))));

        let result = fetch_url("ftp://example.com/file", &plain_config()).await;
        assert!(matches!(result, Err(FolioError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_url_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s/abc"))
            .and(header_eq("referer", "https://mp.weixin.qq.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(&server)
            .await;

        let config = FetchConfig { referer: Some("https://mp.weixin.qq.com/".to_string()), ..plain_config() };
        let html = fetch_url(&format!("{}/s/abc", server.uri()), &config).await.unwrap();
        assert!(html.contains("js_content"));
    }

    #[tokio::test]
    async fn test_fetch_url_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_url(&format!("{}/missing", server.uri()), &plain_config()).await;
        assert!(matches!(result, Err(FolioError::HttpStatus { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_url_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = FetchConfig { timeout: 1, ..plain_config() };
        let result = fetch_url(&server.uri(), &config).await;
        assert!(matches!(result, Err(FolioError::Timeout { timeout: 1 })));
    }

    #[tokio::test]
    async fn test_fetch_article_without_render_returns_plain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHELL))
            .mount(&server)
            .await;

        let html = fetch_article(&server.uri(), &plain_config()).await.unwrap();
        assert_eq!(html, SHELL);
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(FolioError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_reads() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page.html");
        std::fs::write(&file, ARTICLE).unwrap();

        assert_eq!(fetch_file(file.to_str().unwrap()).unwrap(), ARTICLE);
    }

    #[cfg(feature = "render")]
    mod render_fallback {
        use super::*;
        use crate::render::{RenderError, RenderedPage};

        struct FixedRenderer(std::result::Result<&'static str, ()>);

        #[async_trait::async_trait]
        impl Renderer for FixedRenderer {
            async fn render(&self, url: &Url, _opts: &RenderOptions) -> std::result::Result<RenderedPage, RenderError> {
                match self.0 {
                    Ok(html) => Ok(RenderedPage { html: html.to_string(), final_url: url.clone(), render_time_ms: 1 }),
                    Err(()) => Err(RenderError::Timeout(10)),
                }
            }
        }

        #[derive(Default)]
        struct RecordingRenderer(std::sync::Mutex<Option<u64>>);

        #[async_trait::async_trait]
        impl Renderer for RecordingRenderer {
            async fn render(&self, url: &Url, opts: &RenderOptions) -> std::result::Result<RenderedPage, RenderError> {
                *self.0.lock().unwrap() = Some(opts.timeout_ms);
                Ok(RenderedPage { html: ARTICLE.to_string(), final_url: url.clone(), render_time_ms: 1 })
            }
        }

        async fn shell_server() -> MockServer {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(SHELL))
                .mount(&server)
                .await;
            server
        }

        #[tokio::test]
        async fn test_marker_present_skips_renderer() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
                .mount(&server)
                .await;

            let renderer = FixedRenderer(Ok("<p>rendered</p>"));
            let html = fetch_article_with_renderer(&server.uri(), &FetchConfig::default(), &renderer)
                .await
                .unwrap();
            assert_eq!(html, ARTICLE);
        }

        #[tokio::test]
        async fn test_missing_marker_uses_renderer() {
            let server = shell_server().await;
            let renderer = FixedRenderer(Ok(ARTICLE));

            let html = fetch_article_with_renderer(&server.uri(), &FetchConfig::default(), &renderer)
                .await
                .unwrap();
            assert_eq!(html, ARTICLE);
        }

        #[tokio::test]
        async fn test_render_failure_keeps_plain() {
            let server = shell_server().await;
            let renderer = FixedRenderer(Err(()));

            let html = fetch_article_with_renderer(&server.uri(), &FetchConfig::default(), &renderer)
                .await
                .unwrap();
            assert_eq!(html, SHELL);
        }

        #[tokio::test]
        async fn test_render_timeout_saturates() {
            let renderer = RecordingRenderer::default();
            let config = FetchConfig { timeout: u64::MAX, ..Default::default() };

            let html = render_page(&renderer, "https://example.com/a", &config).await.unwrap();
            assert_eq!(html, ARTICLE);
            assert_eq!(*renderer.0.lock().unwrap(), Some(u64::MAX));
        }

        #[tokio::test]
        async fn test_http_error_then_render() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(403))
                .mount(&server)
                .await;

            let renderer = FixedRenderer(Ok(ARTICLE));
            let html = fetch_article_with_renderer(&server.uri(), &FetchConfig::default(), &renderer)
                .await
                .unwrap();
            assert_eq!(html, ARTICLE);

            let failing = FixedRenderer(Err(()));
            let result = fetch_article_with_renderer(&server.uri(), &FetchConfig::default(), &failing).await;
            assert!(matches!(result, Err(FolioError::HttpStatus { status: 403, .. })));
        }
    }
}
