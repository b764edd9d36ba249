use async_trait::async_trait;
use lopdf::Document;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::warn;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::domain::value_objects::DocumentType;

pub struct PdfExtractor {
    password: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            password: String::new(),
        }
    }

    fn extract(data: &[u8], password: &str) -> Result<ExtractedContent, DocumentExtractionError> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt(password).map_err(|_e| {
                DocumentExtractionError::ExtractionFailed(
                    "Failed to decrypt PDF - invalid password".to_string(),
                )
            })?;
        }

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();

        let extracted_pages: Vec<Result<(u32, Vec<String>), String>> = page_numbers
            .into_par_iter()
            .map(|page_num| -> Result<(u32, Vec<String>), String> {
                let text = doc.extract_text(&[page_num]).map_err(|e| {
                    format!("Failed to extract text from page {}: {}", page_num, e)
                })?;

                let lines: Vec<String> = text
                    .split('\n')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();

                Ok((page_num, lines))
            })
            .collect();

        let mut all_lines = Vec::new();
        for page_result in extracted_pages {
            match page_result {
                Ok((_, lines)) => all_lines.extend(lines),
                Err(e) => warn!(error = %e, "Skipping unreadable PDF page"),
            }
        }

        ExtractedContent::new(all_lines.join("\n"), DocumentType::Pdf).non_empty()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
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
        let password = self.password.clone();
        tokio::task::spawn_blocking(move || Self::extract(&data, &password))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        document_type == DocumentType::Pdf
    }
}
