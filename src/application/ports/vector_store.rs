use async_trait::async_trait;
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("Vector store is not configured: {0}")]
    Configuration(String),
    #[error("Index creation failed: {0}")]
    IndexCreation(String),
    #[error("Upsert failed: {0}")]
    Upsert(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Metadata stored next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub text: String,
    pub file_name: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vector,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Map<String, Value>,
}

impl VectorMatch {
    pub fn text(&self) -> &str {
        self.metadata
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the index when missing and waits (bounded) for it to become
    /// ready. Not-ready after the wait is logged, not an error.
    async fn ensure_index(&self) -> Result<(), VectorStoreError>;

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, VectorStoreError>;

    async fn query(&self, vector: &Vector, top_k: usize)
    -> Result<Vec<VectorMatch>, VectorStoreError>;
}
