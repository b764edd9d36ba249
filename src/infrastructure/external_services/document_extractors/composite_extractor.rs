use std::sync::Arc;

use async_trait::async_trait;

use super::{DocxExtractor, HtmlExtractor, PdfExtractor, PlainTextExtractor};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::domain::value_objects::DocumentType;

/// Routes each document type to its extractor.
pub struct CompositeDocumentExtractor {
    html_extractor: Arc<HtmlExtractor>,
    pdf_extractor: Arc<PdfExtractor>,
    docx_extractor: Arc<DocxExtractor>,
    text_extractor: Arc<PlainTextExtractor>,
}

impl CompositeDocumentExtractor {
    pub fn new() -> Self {
        Self {
            html_extractor: Arc::new(HtmlExtractor::new()),
            pdf_extractor: Arc::new(PdfExtractor::new()),
            docx_extractor: Arc::new(DocxExtractor::new()),
            text_extractor: Arc::new(PlainTextExtractor::new()),
        }
    }

    fn get_extractor_for_type(&self, document_type: DocumentType) -> Arc<dyn DocumentExtractor> {
        match document_type {
            DocumentType::Pdf => self.pdf_extractor.clone(),
            DocumentType::Docx => self.docx_extractor.clone(),
            DocumentType::Html => self.html_extractor.clone(),
            DocumentType::Text | DocumentType::Json => self.text_extractor.clone(),
        }
    }
}

impl Default for CompositeDocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for CompositeDocumentExtractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        self.get_extractor_for_type(document_type)
            .extract_text_from_bytes(data, document_type)
            .await
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        self.get_extractor_for_type(document_type)
            .can_extract(document_type)
    }
}
