use async_trait::async_trait;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::domain::value_objects::DocumentType;

/// Text and JSON are stored as written; invalid UTF-8 is replaced rather
/// than rejected.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        if !self.can_extract(document_type) {
            return Err(DocumentExtractionError::UnsupportedFormat(
                document_type.to_string(),
            ));
        }

        let text = String::from_utf8_lossy(data).into_owned();
        ExtractedContent::new(text, document_type).non_empty()
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        matches!(document_type, DocumentType::Text | DocumentType::Json)
    }
}
