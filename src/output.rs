//! What a converter hands back.

use serde::{Deserialize, Serialize};

/// A converted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Rendered Markdown text, written verbatim to the output file.
    pub markdown: String,

    /// Converter metadata (Marker's `<stem>_meta.json`), when it wrote any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl RenderedDocument {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            metadata: None,
        }
    }

    /// Number of pages the converter reports, if its metadata says so.
    pub fn page_count(&self) -> Option<usize> {
        self.metadata
            .as_ref()?
            .get("page_stats")?
            .as_array()
            .map(Vec::len)
    }
}
