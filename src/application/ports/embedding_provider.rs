use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingProviderError {
    #[error("Embedding API key is not configured")]
    MissingCredential,
    #[error("Embedding API key format appears invalid")]
    InvalidCredential,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone)]
pub struct BatchEmbeddingResponse {
    pub embeddings: Vec<Vector>,
    pub total_tokens: Option<i32>,
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Cheap local check run before any remote call.
    fn validate_credentials(&self) -> Result<(), EmbeddingProviderError>;

    async fn generate_embedding(&self, text: &str) -> Result<Vector, EmbeddingProviderError>;

    /// One vector per input text, in input order.
    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError>;
}
