//! Image download and filesystem staging.
//!
//! [`ImageStore`] downloads the images an article references into a
//! temporary directory so the document writer can embed them. A failed
//! download never aborts the run: it is logged and the image is skipped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, header};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::fetch::DEFAULT_USER_AGENT;
use crate::image::normalize_image_url;
use crate::media::ImageFormat;
use crate::{FolioError, Result};

/// Configuration for image downloads.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Request timeout in seconds (default: 10).
    pub timeout: u64,
    /// User-Agent header.
    pub user_agent: String,
    /// `Referer` header; image hosts often refuse hotlinking without one.
    pub referer: Option<String>,
    /// Maximum image size in bytes (default: 10MB).
    pub max_bytes: usize,
    /// Lower bound of the pause between downloads, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the pause between downloads, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: Some("https://mp.weixin.qq.com/".to_string()),
            max_bytes: 10 * 1024 * 1024,
            min_delay_ms: 200,
            max_delay_ms: 600,
        }
    }
}

impl ImageConfig {
    /// Random pause within the configured bounds.
    fn delay(&self) -> Duration {
        let span = self.max_delay_ms.saturating_sub(self.min_delay_ms);
        let jitter = (span as f64 * rand::random::<f64>()) as u64;
        Duration::from_millis(self.min_delay_ms + jitter)
    }
}

/// Downloads images into a private temporary directory.
///
/// Staged files live as long as the store.
pub struct ImageStore {
    dir: TempDir,
    client: Client,
    config: ImageConfig,
    staged: HashMap<String, PathBuf>,
    failed: HashSet<String>,
}

impl ImageStore {
    /// Creates a store with its own temporary directory.
    pub fn new(config: ImageConfig) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("folio-images-").tempdir()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(&config.user_agent)
            .build()
            .map_err(FolioError::HttpError)?;

        Ok(Self { dir, client, config, staged: HashMap::new(), failed: HashSet::new() })
    }

    /// Directory holding staged files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Number of staged images.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Local path of a staged image.
    pub fn resolve(&self, url: &str) -> Option<&Path> {
        self.staged.get(&normalize_image_url(url)).map(PathBuf::as_path)
    }

    /// Downloads every URL once, pausing a random interval between requests.
    ///
    /// Returns the number of images staged by this call. Failures are logged
    /// and skipped.
    pub async fn fetch_all<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) -> usize {
        let mut staged = 0;
        let mut first = true;

        for url in urls {
            let url = normalize_image_url(url);
            if self.staged.contains_key(&url) || self.failed.contains(&url) {
                continue;
            }
            if !first {
                tokio::time::sleep(self.config.delay()).await;
            }
            first = false;

            match self.fetch(&url).await {
                Ok(path) => {
                    tracing::debug!(url = %url, path = %path.display(), "staged image");
                    staged += 1;
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "skipping image"),
            }
        }

        staged
    }

    /// Downloads a single image, or returns the already staged path.
    ///
    /// # Errors
    ///
    /// - [`FolioError::InvalidUrl`] for non-HTTP URLs.
    /// - [`FolioError::HttpStatus`], [`FolioError::Timeout`] or
    ///   [`FolioError::HttpError`] for failed requests.
    /// - [`FolioError::Image`] for oversized or unsupported images.
    pub async fn fetch(&mut self, url: &str) -> Result<PathBuf> {
        let url = normalize_image_url(url);
        if let Some(path) = self.staged.get(&url) {
            return Ok(path.clone());
        }

        match self.download(&url).await {
            Ok(path) => {
                self.staged.insert(url, path.clone());
                Ok(path)
            }
            Err(e) => {
                self.failed.insert(url);
                Err(e)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<PathBuf> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FolioError::InvalidUrl(format!("not an http(s) image URL: {}", url)));
        }

        let mut request = self.client.get(url);
        if let Some(referer) = &self.config.referer {
            request = request.header(header::REFERER, referer);
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FolioError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FolioError::Image(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
        if bytes.len() > self.config.max_bytes {
            return Err(FolioError::Image(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| FolioError::Image(format!("unsupported image format: {}", url)))?;

        let path = self.dir.path().join(staged_name(url, format));
        fs::write(&path, &bytes)?;
        Ok(path)
    }

    fn request_error(&self, err: reqwest::Error) -> FolioError {
        if err.is_timeout() { FolioError::Timeout { timeout: self.config.timeout } } else { FolioError::HttpError(err) }
    }
}

/// `img_<sha256 prefix>.<ext>` for a source URL.
fn staged_name(url: &str, format: ImageFormat) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("img_{}.{}", &digest[..16], format.extension())
}
