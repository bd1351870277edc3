pub mod docx;
pub mod json;
pub mod markdown;

pub use docx::{DocxConfig, DocxWriter, default_output_name, write_document};
pub use json::{JsonOutput, JsonStats, convert_to_json, metadata_to_json};
pub use markdown::{MarkdownConfig, convert_to_markdown};
