//! Progress reporting for extraction runs.
//!
//! The extractor never configures logging itself. It reports what it does
//! to an [`ExtractObserver`] handed in by the caller; [`TracingObserver`]
//! forwards events to `tracing`, [`NullObserver`] drops them.

use std::sync::Mutex;

use crate::locate::RootMatch;
use crate::metadata::Metadata;

/// Something that happened during one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractEvent {
    /// The source URL did not parse; relative image references stay as written.
    SourceUrlIgnored { url: String, reason: String },
    /// Title, author and date resolution finished.
    Metadata(Metadata),
    /// A content root was found.
    RootLocated(RootMatch),
    /// No content root was found; the run fails.
    RootMissing,
    /// The tree walk finished.
    TreeWalked { raw_blocks: usize, visited: usize, truncated: usize },
    /// Primary output was sparse and the fallback scan ran.
    Fallback { primary: usize, found: usize, appended: usize },
    /// Extraction finished with this many blocks.
    Finished { blocks: usize },
}

/// Receiver of [`ExtractEvent`]s, scoped to the extractor it is given to.
pub trait ExtractObserver: Send + Sync {
    fn on_event(&self, event: &ExtractEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ExtractObserver for NullObserver {
    fn on_event(&self, _event: &ExtractEvent) {}
}

/// Emits events as `tracing` records under the `folio::extract` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExtractObserver for TracingObserver {
    fn on_event(&self, event: &ExtractEvent) {
        match event {
            ExtractEvent::SourceUrlIgnored { url, reason } => {
                tracing::warn!(target: "folio::extract", url = %url, reason = %reason, "source URL does not parse, not resolving images")
            }
            ExtractEvent::Metadata(metadata) => tracing::debug!(
                target: "folio::extract",
                title = ?metadata.title,
                author = ?metadata.author,
                date = ?metadata.date,
                "resolved metadata"
            ),
            ExtractEvent::RootLocated(RootMatch::Selector(selector)) => {
                tracing::debug!(target: "folio::extract", selector, "content root matched known container")
            }
            ExtractEvent::RootLocated(RootMatch::LargestContainer { text_len }) => {
                tracing::debug!(target: "folio::extract", text_len, "content root chosen by size")
            }
            ExtractEvent::RootMissing => tracing::warn!(target: "folio::extract", "no content root found"),
            ExtractEvent::TreeWalked { raw_blocks, visited, truncated } => {
                tracing::debug!(target: "folio::extract", raw_blocks, visited, truncated, "walked content tree");
                if *truncated > 0 {
                    tracing::warn!(target: "folio::extract", truncated, "depth bound cut off branches");
                }
            }
            ExtractEvent::Fallback { primary, found, appended } => tracing::info!(
                target: "folio::extract",
                primary,
                found,
                appended,
                "few blocks found, ran fallback scan"
            ),
            ExtractEvent::Finished { blocks } => tracing::info!(target: "folio::extract", blocks, "extraction finished"),
        }
    }
}

/// Keeps every event in memory, mostly useful in tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ExtractEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<ExtractEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl ExtractObserver for RecordingObserver {
    fn on_event(&self, event: &ExtractEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
