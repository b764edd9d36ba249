use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::ports::DocumentExtractor;
use crate::application::ports::document_extractor::DocumentExtractionError;
use crate::application::services::vectorization_service::{
    VectorizationError, VectorizationService,
};
use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::domain::value_objects::{DocumentType, TextPreview};

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Extraction error: {0}")]
    ExtractionError(String),
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Vector store error: {0}")]
    VectorStoreError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Fetch error: {0}")]
    FetchError(String),
}

impl From<DocumentRepositoryError> for IngestionError {
    fn from(err: DocumentRepositoryError) -> Self {
        match err {
            DocumentRepositoryError::ConnectionError(msg) => IngestionError::ConnectionError(msg),
            DocumentRepositoryError::ValidationError(msg) => IngestionError::ValidationError(msg),
            other => IngestionError::RepositoryError(other.to_string()),
        }
    }
}

impl From<DocumentExtractionError> for IngestionError {
    fn from(err: DocumentExtractionError) -> Self {
        IngestionError::ExtractionError(err.to_string())
    }
}

impl From<VectorizationError> for IngestionError {
    fn from(err: VectorizationError) -> Self {
        match err {
            VectorizationError::VectorStoreError(msg) => IngestionError::VectorStoreError(msg),
            other => IngestionError::EmbeddingError(other.to_string()),
        }
    }
}

/// Second phase of an ingestion. The row exists either way; only the
/// searchable copy may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorizationStatus {
    Completed { chunks: usize },
    Degraded(String),
}

impl VectorizationStatus {
    pub fn is_vectorized(&self) -> bool {
        matches!(self, VectorizationStatus::Completed { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            VectorizationStatus::Completed { .. } => None,
            VectorizationStatus::Degraded(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub document: Document,
    pub vectorization: VectorizationStatus,
}

#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub file_name: String,
    pub document_type: DocumentType,
    pub data: Vec<u8>,
    pub url: Option<String>,
}

pub struct IngestionService {
    extractor: Arc<dyn DocumentExtractor>,
    repository: Arc<dyn DocumentRepository>,
    vectorizer: Arc<VectorizationService>,
}

impl IngestionService {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        repository: Arc<dyn DocumentRepository>,
        vectorizer: Arc<VectorizationService>,
    ) -> Self {
        Self {
            extractor,
            repository,
            vectorizer,
        }
    }

    pub async fn prepare_index(&self) {
        self.vectorizer.prepare_index().await;
    }

    /// Extracts text from raw bytes, then stores and vectorizes it.
    pub async fn ingest(
        &self,
        request: IngestionRequest,
    ) -> Result<IngestionOutcome, IngestionError> {
        if request.file_name.trim().is_empty() {
            return Err(IngestionError::ValidationError(
                "File name is required".to_string(),
            ));
        }

        info!(
            file_name = %request.file_name,
            document_type = %request.document_type,
            size = request.data.len(),
            "Extracting text"
        );

        let extracted = self
            .extractor
            .extract_text_from_bytes(&request.data, request.document_type)
            .await
            .and_then(|content| content.non_empty())
            .inspect_err(|e| error!(file_name = %request.file_name, error = %e, "Extraction failed"))?;

        self.ingest_text(
            &request.file_name,
            &extracted.text,
            request.document_type,
            request.url,
        )
        .await
    }

    /// Stores the metadata row, then vectorizes the full text. A failure in
    /// the second step is reported in the outcome rather than returned.
    pub async fn ingest_text(
        &self,
        file_name: &str,
        text: &str,
        document_type: DocumentType,
        url: Option<String>,
    ) -> Result<IngestionOutcome, IngestionError> {
        if text.trim().is_empty() {
            return Err(IngestionError::ExtractionError(format!(
                "No text could be extracted from the {} document",
                document_type
            )));
        }

        let new_document = NewDocument::new(file_name, document_type)
            .with_preview(TextPreview::from_text(text))
            .with_url(url);
        new_document
            .validate()
            .map_err(IngestionError::ValidationError)?;

        let document = self.repository.create(&new_document).await?;
        info!(document_id = %document.id(), file_name, "Saved document metadata");

        let vectorization = match self.vectorizer.vectorize(text, file_name).await {
            Ok(report) => VectorizationStatus::Completed {
                chunks: report.chunk_count,
            },
            Err(e) => {
                warn!(document_id = %document.id(), error = %e, "Document saved but not vectorized");
                VectorizationStatus::Degraded(e.to_string())
            }
        };

        Ok(IngestionOutcome {
            document,
            vectorization,
        })
    }
}
