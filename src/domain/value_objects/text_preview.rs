use serde::{Deserialize, Serialize};

pub const PREVIEW_CHARS: usize = 500;

/// Truncated prefix of a document's text. This is all the metadata store
/// ever keeps of the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPreview(String);

impl TextPreview {
    pub fn from_text(text: &str) -> Self {
        Self::with_limit(text, PREVIEW_CHARS)
    }

    pub fn with_limit(text: &str, limit: usize) -> Self {
        match text.char_indices().nth(limit) {
            Some((byte_offset, _)) => Self(format!("{}...", &text[..byte_offset])),
            None => Self(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
