use async_trait::async_trait;
use html2text::from_read;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::domain::value_objects::DocumentType;

const TEXT_WIDTH: usize = 80;

pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_from_html_content(html_content: &[u8]) -> Result<String, DocumentExtractionError> {
        from_read(html_content, TEXT_WIDTH).map_err(|e| {
            DocumentExtractionError::ExtractionFailed(format!(
                "Failed to convert HTML to text: {}",
                e
            ))
        })
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for HtmlExtractor {
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

        let data = data.to_vec();
        let text = tokio::task::spawn_blocking(move || Self::extract_from_html_content(&data))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))??;

        ExtractedContent::new(text, DocumentType::Html).non_empty()
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        document_type == DocumentType::Html
    }
}
