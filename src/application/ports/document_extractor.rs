use async_trait::async_trait;

use crate::domain::value_objects::DocumentType;

#[derive(Debug, thiserror::Error)]
pub enum DocumentExtractionError {
    #[error("No text could be extracted from the {0} document")]
    Empty(DocumentType),
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub text: String,
    pub document_type: DocumentType,
}

impl ExtractedContent {
    pub fn new(text: String, document_type: DocumentType) -> Self {
        Self {
            text,
            document_type,
        }
    }

    /// Rejects output that is empty once trimmed. An empty success would
    /// otherwise create content-less, vector-less rows.
    pub fn non_empty(self) -> Result<Self, DocumentExtractionError> {
        if self.text.trim().is_empty() {
            return Err(DocumentExtractionError::Empty(self.document_type));
        }
        Ok(self)
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedContent, DocumentExtractionError>;

    fn can_extract(&self, document_type: DocumentType) -> bool;
}
