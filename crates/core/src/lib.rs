pub mod article;
pub mod block;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod formatters;
pub mod image;
#[cfg(feature = "fetch")]
pub mod images;
pub mod locate;
pub mod media;
pub mod metadata;
pub mod observer;
pub mod parse;
pub mod postprocess;
pub mod preprocess;
#[cfg(feature = "render")]
pub mod render;
pub mod text;
pub mod tree;

pub use article::{ExtractionResult, OutputFormat, UNKNOWN_AUTHOR};
pub use block::{ContentBlock, ListStyle, RawBlock};
pub use error::{FolioError, Result};
pub use extract::{DEFAULT_TITLE, ExtractConfig, ExtractConfigBuilder, Extractor, extract, extract_with_url};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_article, fetch_file, fetch_stdin, fetch_url};
#[cfg(feature = "render")]
pub use fetch::fetch_article_with_renderer;
pub use formatters::{DocxConfig, DocxWriter, MarkdownConfig, default_output_name, write_document};
pub use formatters::{convert_to_json, convert_to_markdown, metadata_to_json};
#[cfg(feature = "fetch")]
pub use images::{ImageConfig, ImageStore};
pub use locate::{RootMatch, locate_root};
pub use metadata::{Acceptance, Metadata, Strategy};
pub use observer::{ExtractEvent, ExtractObserver, NullObserver, RecordingObserver, TracingObserver};
pub use parse::{Document, Element};
pub use postprocess::{append_fallback, postprocess};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
#[cfg(feature = "render")]
pub use render::{HeadlessRenderer, RenderOptions, Renderer};
pub use tree::{TraversalContext, fallback_scan};
