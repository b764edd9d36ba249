use async_trait::async_trait;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::domain::value_objects::DocumentType;

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract(data: &[u8]) -> Result<ExtractedContent, DocumentExtractionError> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        let mut paragraphs = Vec::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut line = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                line.push_str(&t.text);
                            }
                        }
                    }
                }
                if !line.trim().is_empty() {
                    paragraphs.push(line);
                }
            }
        }

        ExtractedContent::new(paragraphs.join("\n"), DocumentType::Docx).non_empty()
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
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
        tokio::task::spawn_blocking(move || Self::extract(&data))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        document_type == DocumentType::Docx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_paragraphs_become_lines() {
        let data = docx_bytes(&["First paragraph.", "", "Second paragraph."]);

        let content = DocxExtractor::new()
            .extract_text_from_bytes(&data, DocumentType::Docx)
            .await
            .unwrap();

        assert_eq!(content.text, "First paragraph.\nSecond paragraph.");
    }

    #[tokio::test]
    async fn test_empty_document_is_an_error() {
        let data = docx_bytes(&[]);

        let result = DocxExtractor::new()
            .extract_text_from_bytes(&data, DocumentType::Docx)
            .await;

        assert!(matches!(result, Err(DocumentExtractionError::Empty(DocumentType::Docx))));
    }

    #[tokio::test]
    async fn test_garbage_is_corrupted() {
        let result = DocxExtractor::new()
            .extract_text_from_bytes(b"PK not really", DocumentType::Docx)
            .await;

        assert!(matches!(result, Err(DocumentExtractionError::CorruptedFile(_))));
    }
}
