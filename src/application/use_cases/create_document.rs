use std::sync::Arc;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::domain::value_objects::{DocumentType, TextPreview};

#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub filename: Option<String>,
    pub document_type: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

pub struct CreateDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl CreateDocumentUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            document_repository,
        }
    }

    pub async fn execute(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<Document, DocumentRepositoryError> {
        let filename = request.filename.unwrap_or_default();
        let tag = request.document_type.unwrap_or_default();

        if filename.trim().is_empty() || tag.trim().is_empty() {
            return Err(DocumentRepositoryError::ValidationError(
                "Missing required fields (filename, type)".to_string(),
            ));
        }

        let document = NewDocument::new(filename, DocumentType::from_tag(&tag))
            .with_content(request.content.map(|c| TextPreview::from_text(&c).into_inner()))
            .with_url(request.url);

        self.document_repository.create(&document).await
    }
}
