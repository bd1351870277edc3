use serde::Serialize;

use crate::Result;
use crate::article::ExtractionResult;
use crate::metadata::Metadata;

/// JSON output: the extraction result plus derived statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    #[serde(flatten)]
    pub result: &'a ExtractionResult,
    pub stats: JsonStats,
}

/// Derived counts included alongside the blocks.
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    pub blocks: usize,
    pub images: usize,
    pub word_count: usize,
}

impl<'a> From<&'a ExtractionResult> for JsonOutput<'a> {
    fn from(result: &'a ExtractionResult) -> Self {
        let stats = JsonStats {
            blocks: result.blocks.len(),
            images: result.image_urls().len(),
            word_count: result.word_count(),
        };
        Self { result, stats }
    }
}

/// Convert an extraction result to JSON
pub fn convert_to_json(result: &ExtractionResult, pretty: bool) -> Result<String> {
    let output = JsonOutput::from(result);
    if pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// Convert metadata to JSON (for --metadata-only)
pub fn metadata_to_json(metadata: &Metadata, pretty: bool) -> Result<String> {
    if pretty { Ok(serde_json::to_string_pretty(metadata)?) } else { Ok(serde_json::to_string(metadata)?) }
}
