use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::services::IngestionService;
use crate::application::services::ingestion_service::{IngestionError, IngestionRequest};
use crate::domain::value_objects::DocumentType;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const REJECTED_MEDIA_PREFIXES: [&str; 3] = ["image/", "audio/", "video/"];

#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadFileResponse {
    pub document_id: Uuid,
    pub file_name: String,
    pub document_type: DocumentType,
    pub vectorized: bool,
    pub message: String,
}

pub struct UploadFileUseCase {
    ingestion_service: Arc<IngestionService>,
    max_upload_bytes: usize,
}

impl UploadFileUseCase {
    pub fn new(ingestion_service: Arc<IngestionService>, max_upload_bytes: usize) -> Self {
        Self {
            ingestion_service,
            max_upload_bytes,
        }
    }

    pub async fn execute(
        &self,
        request: UploadFileRequest,
    ) -> Result<UploadFileResponse, IngestionError> {
        if request.file_name.trim().is_empty() {
            return Err(IngestionError::ValidationError(
                "File name cannot be empty".to_string(),
            ));
        }

        if request.file_data.is_empty() {
            return Err(IngestionError::ValidationError(
                "File data cannot be empty".to_string(),
            ));
        }

        if request.file_data.len() > self.max_upload_bytes {
            return Err(IngestionError::ValidationError(format!(
                "File is too large: {} bytes (limit {} bytes)",
                request.file_data.len(),
                self.max_upload_bytes
            )));
        }

        if let Some(content_type) = request.content_type.as_deref() {
            let lowered = content_type.to_ascii_lowercase();
            if REJECTED_MEDIA_PREFIXES
                .iter()
                .any(|prefix| lowered.starts_with(prefix))
            {
                return Err(IngestionError::ValidationError(format!(
                    "Unsupported file type: {}",
                    content_type
                )));
            }
        }

        self.ingestion_service.prepare_index().await;

        let document_type =
            DocumentType::detect(request.content_type.as_deref(), &request.file_name);

        info!(file_name = %request.file_name, %document_type, "Processing uploaded file");

        let outcome = self
            .ingestion_service
            .ingest(IngestionRequest {
                file_name: request.file_name.clone(),
                document_type,
                data: request.file_data,
                url: None,
            })
            .await?;

        let vectorized = outcome.vectorization.is_vectorized();
        let message = match outcome.vectorization.warning() {
            None => "File fully processed".to_string(),
            Some(reason) => format!("File saved but not vectorized for search: {}", reason),
        };

        Ok(UploadFileResponse {
            document_id: outcome.document.id(),
            file_name: request.file_name,
            document_type,
            vectorized,
            message,
        })
    }
}
