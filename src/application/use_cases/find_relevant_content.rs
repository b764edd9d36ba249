use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::application::services::RetrievalService;
use crate::application::services::retrieval_service::RelevantContent;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRelevantContentResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_content: Option<Vec<RelevantContent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct FindRelevantContentUseCase {
    retrieval_service: Arc<RetrievalService>,
}

impl FindRelevantContentUseCase {
    pub fn new(retrieval_service: Arc<RetrievalService>) -> Self {
        Self { retrieval_service }
    }

    /// Never fails: "nothing found" and errors are both reported as data.
    pub async fn execute(&self, question: &str) -> FindRelevantContentResponse {
        match self.retrieval_service.find_relevant(question).await {
            Ok(results) if results.is_empty() => FindRelevantContentResponse {
                found: false,
                relevant_content: None,
                message: Some("No relevant information found in the knowledge base".to_string()),
                error: None,
            },
            Ok(results) => FindRelevantContentResponse {
                found: true,
                relevant_content: Some(results),
                message: None,
                error: None,
            },
            Err(e) => {
                error!(error = %e, "Knowledge base search failed");
                FindRelevantContentResponse {
                    found: false,
                    relevant_content: None,
                    message: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
