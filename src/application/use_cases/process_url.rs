use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::ports::ContentFetcher;
use crate::application::services::IngestionService;
use crate::application::services::ingestion_service::{IngestionError, IngestionRequest};
use crate::domain::value_objects::DocumentType;

#[derive(Debug, Clone)]
pub struct ProcessUrlRequest {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct ProcessUrlResponse {
    pub document_id: Uuid,
    pub file_name: String,
    pub url: String,
    pub document_type: DocumentType,
    pub vectorized: bool,
    pub message: String,
}

pub struct ProcessUrlUseCase {
    content_fetcher: Arc<dyn ContentFetcher>,
    ingestion_service: Arc<IngestionService>,
}

impl ProcessUrlUseCase {
    pub fn new(
        content_fetcher: Arc<dyn ContentFetcher>,
        ingestion_service: Arc<IngestionService>,
    ) -> Self {
        Self {
            content_fetcher,
            ingestion_service,
        }
    }

    pub async fn execute(
        &self,
        request: ProcessUrlRequest,
    ) -> Result<ProcessUrlResponse, IngestionError> {
        let url = request.url.trim().to_string();
        if url.is_empty() {
            return Err(IngestionError::ValidationError("URL is required".to_string()));
        }
        if request.file_name.trim().is_empty() {
            return Err(IngestionError::ValidationError(
                "File name is required".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(IngestionError::ValidationError(format!(
                "Invalid URL, it must start with http:// or https://: {}",
                url
            )));
        }

        self.ingestion_service.prepare_index().await;

        let fetched = self
            .content_fetcher
            .fetch(&url)
            .await
            .map_err(|e| IngestionError::FetchError(e.to_string()))?;

        let document_type = fetched
            .content_type
            .as_deref()
            .map(DocumentType::from_content_type)
            .unwrap_or_default();

        info!(%url, %document_type, size = fetched.body.len(), "Fetched URL content");

        let outcome = self
            .ingestion_service
            .ingest(IngestionRequest {
                file_name: request.file_name.clone(),
                document_type,
                data: fetched.body,
                url: Some(url.clone()),
            })
            .await?;

        let vectorized = outcome.vectorization.is_vectorized();
        let message = match outcome.vectorization.warning() {
            None => "URL processed successfully".to_string(),
            Some(reason) => format!("URL saved but not vectorized for search: {}", reason),
        };

        Ok(ProcessUrlResponse {
            document_id: outcome.document.id(),
            file_name: request.file_name,
            url,
            document_type,
            vectorized,
            message,
        })
    }
}
