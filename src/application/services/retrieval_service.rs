use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::application::ports::{EmbeddingProvider, VectorStore};

pub const TOP_K: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Vector store error: {0}")]
    VectorStoreError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevantContent {
    pub content: String,
    pub metadata: Map<String, Value>,
    /// Display-only rank decay: 1.0 for the best match, 0.1 less per rank.
    pub relevance: f32,
    /// Similarity reported by the vector store.
    pub score: f32,
}

pub struct RetrievalService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl RetrievalService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedding_provider,
            vector_store,
        }
    }

    pub async fn find_relevant(&self, query: &str) -> Result<Vec<RelevantContent>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        self.embedding_provider
            .validate_credentials()
            .map_err(|e| RetrievalError::EmbeddingError(e.to_string()))?;

        let vector = self
            .embedding_provider
            .generate_embedding(query)
            .await
            .map_err(|e| RetrievalError::EmbeddingError(e.to_string()))?;

        let matches = self
            .vector_store
            .query(&vector, TOP_K)
            .await
            .map_err(|e| RetrievalError::VectorStoreError(e.to_string()))?;

        info!(query, matches = matches.len(), "Vector search completed");

        Ok(matches
            .into_iter()
            .enumerate()
            .map(|(rank, found)| RelevantContent {
                content: found.text().to_string(),
                relevance: (1.0 - 0.1 * rank as f32).max(0.0),
                score: found.score,
                metadata: found.metadata,
            })
            .collect())
    }
}
