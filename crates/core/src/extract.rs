//! Main content extraction API.
//!
//! This module sequences the pipeline over one document: metadata
//! resolution, content root location, the tree walk, block post-processing
//! and the sparse-result fallback. The entry point is [`Extractor`], along
//! with the convenience functions [`extract`] and [`extract_with_url`].
//!
//! # Example
//!
//! ```rust
//! use folio_core::extract;
//!
//! let html = r#"<h1 class="rich_media_title">T</h1>
//!     <div class="rich_media_content"><p>Hi</p><img data-src="//x/y.jpg"></div>"#;
//! let result = extract(html).unwrap();
//!
//! assert_eq!(result.title, "T");
//! assert_eq!(result.blocks.len(), 2);
//! ```

use std::sync::Arc;
use url::Url;

use crate::article::ExtractionResult;
use crate::locate::{DEFAULT_MIN_ROOT_CHARS, locate_root};
use crate::observer::{ExtractEvent, ExtractObserver, TracingObserver};
use crate::parse::Document;
use crate::postprocess::{append_fallback, postprocess};
use crate::tree::{DEFAULT_FALLBACK_MIN_CHARS, DEFAULT_MAX_DEPTH, TraversalContext, fallback_scan};
use crate::{FolioError, Result};

/// Title used when no strategy finds one.
pub const DEFAULT_TITLE: &str = "Untitled Article";

/// Configuration for the extraction pipeline.
///
/// # Example
///
/// ```rust
/// use folio_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .max_depth(30)
///     .fallback_threshold(3)
///     .dedupe_fallback(false)
///     .build();
/// assert_eq!(config.max_depth, 30);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Depth bound of the tree walk, root at depth 0 (default: 20).
    pub max_depth: usize,

    /// Minimum text length for the size-based root scan (default: 500).
    pub min_root_chars: usize,

    /// The fallback scan runs when fewer blocks than this were found (default: 5).
    pub fallback_threshold: usize,

    /// Minimum text length of fallback paragraphs (default: 20).
    pub fallback_min_chars: usize,

    /// Whether fallback blocks equal to already emitted ones are dropped (default: true).
    pub dedupe_fallback: bool,

    /// Whether markup is cleaned with the preprocessor before parsing (default: true).
    pub preprocess: bool,

    /// Title used when none is found (default: "Untitled Article").
    pub default_title: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_root_chars: DEFAULT_MIN_ROOT_CHARS,
            fallback_threshold: 5,
            fallback_min_chars: DEFAULT_FALLBACK_MIN_CHARS,
            dedupe_fallback: true,
            preprocess: true,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets the tree walk depth bound.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.config.max_depth = value;
        self
    }

    /// Sets the minimum text length for the size-based root scan.
    pub fn min_root_chars(mut self, value: usize) -> Self {
        self.config.min_root_chars = value;
        self
    }

    /// Sets the block count below which the fallback scan runs.
    pub fn fallback_threshold(mut self, value: usize) -> Self {
        self.config.fallback_threshold = value;
        self
    }

    /// Sets the minimum fallback paragraph length.
    pub fn fallback_min_chars(mut self, value: usize) -> Self {
        self.config.fallback_min_chars = value;
        self
    }

    /// Sets whether duplicate fallback blocks are dropped.
    pub fn dedupe_fallback(mut self, value: bool) -> Self {
        self.config.dedupe_fallback = value;
        self
    }

    /// Sets whether markup is preprocessed before parsing.
    pub fn preprocess(mut self, value: bool) -> Self {
        self.config.preprocess = value;
        self
    }

    /// Sets the title used when none is found.
    pub fn default_title(mut self, value: impl Into<String>) -> Self {
        self.config.default_title = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the extraction pipeline.
///
/// An `Extractor` holds only configuration and its observer, so one instance
/// can serve any number of documents, from any thread.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use folio_core::{ExtractConfig, Extractor, NullObserver};
///
/// let extractor = Extractor::with_config(ExtractConfig::default()).observer(Arc::new(NullObserver));
/// let html = r#"<div id="js_content"><p>Body text</p></div>"#;
/// let result = extractor.extract(html, None).unwrap();
/// assert_eq!(result.title, "Untitled Article");
/// ```
#[derive(Clone)]
pub struct Extractor {
    config: ExtractConfig,
    observer: Arc<dyn ExtractObserver>,
}

impl Extractor {
    /// Creates an extractor with default settings reporting to `tracing`.
    pub fn new() -> Self {
        Self::with_config(ExtractConfig::default())
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config, observer: Arc::new(TracingObserver) }
    }

    /// Replaces the observer that receives progress events.
    pub fn observer(mut self, observer: Arc<dyn ExtractObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts an article from markup.
    ///
    /// `source_url` is recorded in the result as given. When it parses as an
    /// absolute URL it is also used to resolve relative image references.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::NoContent`] if no content root can be located.
    pub fn extract(&self, html: &str, source_url: Option<&str>) -> Result<ExtractionResult> {
        let base_url = source_url.and_then(|url| match Url::parse(url) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.observer.on_event(&ExtractEvent::SourceUrlIgnored { url: url.to_string(), reason: e.to_string() });
                None
            }
        });

        let doc = if self.config.preprocess {
            Document::parse_with_preprocessing(html, base_url)?
        } else {
            Document::parse(html)?
        };

        self.extract_document(&doc, source_url)
    }

    /// Extracts an article from an already parsed document.
    pub fn extract_document(&self, doc: &Document, source_url: Option<&str>) -> Result<ExtractionResult> {
        let metadata = doc.extract_metadata();
        self.observer.on_event(&ExtractEvent::Metadata(metadata.clone()));

        let Some((root, how)) = locate_root(doc, self.config.min_root_chars) else {
            self.observer.on_event(&ExtractEvent::RootMissing);
            return Err(FolioError::NoContent);
        };
        self.observer.on_event(&ExtractEvent::RootLocated(how));

        let mut context = TraversalContext::new(self.config.max_depth);
        let raw = context.extract(&root, 0);
        self.observer.on_event(&ExtractEvent::TreeWalked {
            raw_blocks: raw.len(),
            visited: context.visited_count(),
            truncated: context.truncated_branches(),
        });

        let mut blocks = postprocess(raw);
        let primary = blocks.len();
        if primary < self.config.fallback_threshold {
            let fallback = fallback_scan(&root, self.config.fallback_min_chars);
            let found = fallback.len();
            let appended = append_fallback(&mut blocks, fallback, self.config.dedupe_fallback);
            self.observer.on_event(&ExtractEvent::Fallback { primary, found, appended });
        }

        self.observer.on_event(&ExtractEvent::Finished { blocks: blocks.len() });

        Ok(ExtractionResult {
            title: metadata.title.unwrap_or_else(|| self.config.default_title.clone()),
            author: metadata.author,
            date: metadata.date,
            source_url: source_url.map(str::to_string),
            blocks,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function for one-liner extraction with defaults.
///
/// # Errors
///
/// Returns [`FolioError::NoContent`] if no content root can be located.
pub fn extract(html: &str) -> Result<ExtractionResult> {
    Extractor::new().extract(html, None)
}

/// Convenience function for extraction with a known page URL.
///
/// # Errors
///
/// Returns [`FolioError::NoContent`] if no content root can be located.
pub fn extract_with_url(html: &str, url: &str) -> Result<ExtractionResult> {
    Extractor::new().extract(html, Some(url))
}
