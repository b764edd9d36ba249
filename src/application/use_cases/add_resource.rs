use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::services::IngestionService;
use crate::domain::value_objects::DocumentType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResourceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectorized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddResourceResponse {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            resource_id: None,
            vectorized: None,
            error: Some(message.into()),
        }
    }
}

/// Stores free text handed over in conversation as a knowledge-base entry.
pub struct AddResourceUseCase {
    ingestion_service: Arc<IngestionService>,
}

impl AddResourceUseCase {
    pub fn new(ingestion_service: Arc<IngestionService>) -> Self {
        Self { ingestion_service }
    }

    pub fn resource_name() -> String {
        format!("User content {}", Utc::now().format("%Y-%m-%d"))
    }

    /// Never fails: the result is handed back to the model as data.
    pub async fn execute(&self, content: &str) -> AddResourceResponse {
        if content.trim().is_empty() {
            return AddResourceResponse::failed("Content cannot be empty");
        }

        let name = Self::resource_name();
        info!(resource_name = %name, length = content.len(), "Adding resource");

        match self
            .ingestion_service
            .ingest_text(&name, content, DocumentType::Text, None)
            .await
        {
            Ok(outcome) => AddResourceResponse {
                success: true,
                resource_id: Some(outcome.document.id()),
                vectorized: Some(outcome.vectorization.is_vectorized()),
                error: None,
            },
            Err(e) => {
                error!(error = %e, "Failed to add resource");
                AddResourceResponse::failed(e.to_string())
            }
        }
    }
}
