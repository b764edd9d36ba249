use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDocumentResponse {
    pub deleted: bool,
    pub message: String,
}

/// Deleting an id that does not exist is not an error.
pub struct DeleteDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl DeleteDocumentUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            document_repository,
        }
    }

    pub async fn execute(&self, id: &str) -> Result<DeleteDocumentResponse, DocumentRepositoryError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| {
            DocumentRepositoryError::ValidationError(format!("Invalid document id: {}", id))
        })?;

        let deleted = self.document_repository.delete(id).await?;
        info!(document_id = %id, deleted, "Delete requested");

        let message = if deleted {
            "Document deleted".to_string()
        } else {
            "Document not found, nothing to delete".to_string()
        };

        Ok(DeleteDocumentResponse { deleted, message })
    }
}
