use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::application::services::ingestion_service::IngestionError;
use crate::application::use_cases::chat::ChatError;
use crate::domain::repositories::DocumentRepositoryError;
use crate::presentation::http::dto::ApiResponse;

/// Failure of an HTTP request, rendered as `{success: false, error}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Extraction(String),
    #[error("{0}")]
    Connection(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

impl From<IngestionError> for AppError {
    fn from(error: IngestionError) -> Self {
        let message = error.to_string();
        match error {
            IngestionError::ValidationError(_) => AppError::Validation(message),
            IngestionError::ExtractionError(_) | IngestionError::FetchError(_) => {
                AppError::Extraction(message)
            }
            IngestionError::ConnectionError(_) => AppError::Connection(message),
            IngestionError::EmbeddingError(_)
            | IngestionError::VectorStoreError(_)
            | IngestionError::RepositoryError(_) => AppError::Internal(message),
        }
    }
}

impl From<DocumentRepositoryError> for AppError {
    fn from(error: DocumentRepositoryError) -> Self {
        let message = error.to_string();
        match error {
            DocumentRepositoryError::ValidationError(_) => AppError::Validation(message),
            DocumentRepositoryError::ConnectionError(_) => AppError::Connection(message),
            DocumentRepositoryError::DatabaseError(_) | DocumentRepositoryError::MissingTable(_) => {
                AppError::Internal(message)
            }
        }
    }
}

impl From<ChatError> for AppError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::ValidationError(message) => AppError::Validation(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
