use std::sync::Arc;

use pgvector::Vector;
use tracing::{debug, info, warn};

use crate::application::ports::EmbeddingProvider;
use crate::application::ports::VectorStore;
use crate::application::ports::vector_store::{ChunkMetadata, VectorRecord};
use crate::application::services::text_chunker::TextChunker;
use crate::domain::entities::DocumentChunk;
use crate::domain::value_objects::ContentHash;

pub const EMBEDDING_BATCH_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum VectorizationError {
    #[error("No valid content to vectorize")]
    NoContent,
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Vector store error: {0}")]
    VectorStoreError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorizationReport {
    pub chunk_count: usize,
    pub upserted: usize,
}

/// Chunk, embed and upsert one document's text.
pub struct VectorizationService {
    chunker: TextChunker,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl VectorizationService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker: TextChunker::new(),
            embedding_provider,
            vector_store,
            batch_size: EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Makes sure the index exists. Failures are logged and ingestion goes on;
    /// the upsert will report a real problem if there is one.
    pub async fn prepare_index(&self) {
        if let Err(e) = self.vector_store.ensure_index().await {
            warn!(error = %e, "Vector index check failed, continuing");
        }
    }

    pub async fn vectorize(
        &self,
        text: &str,
        file_name: &str,
    ) -> Result<VectorizationReport, VectorizationError> {
        self.embedding_provider
            .validate_credentials()
            .map_err(|e| VectorizationError::EmbeddingError(e.to_string()))?;

        let chunks = DocumentChunk::sequence(self.chunker.chunk(text), file_name);
        if chunks.is_empty() {
            return Err(VectorizationError::NoContent);
        }

        info!(file_name, chunk_count = chunks.len(), "Chunked document");

        let vectors = self.embed_chunks(&chunks).await?;
        let hash = ContentHash::of_document(file_name, text);

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, values)| VectorRecord {
                id: hash.record_id(chunk.chunk_index()),
                values,
                metadata: ChunkMetadata {
                    text: chunk.text().to_string(),
                    file_name: chunk.file_name().to_string(),
                    chunk_index: chunk.chunk_index(),
                    total_chunks: chunk.total_chunks(),
                },
            })
            .collect();

        let upserted = self
            .vector_store
            .upsert(&records)
            .await
            .map_err(|e| VectorizationError::VectorStoreError(e.to_string()))?;

        info!(file_name, upserted, "Stored document vectors");

        Ok(VectorizationReport {
            chunk_count: records.len(),
            upserted,
        })
    }

    async fn embed_chunks(
        &self,
        chunks: &[DocumentChunk],
    ) -> Result<Vec<Vector>, VectorizationError> {
        let mut vectors = Vec::with_capacity(chunks.len());

        for (batch_number, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text().to_string()).collect();

            let response = self
                .embedding_provider
                .generate_embeddings(&texts)
                .await
                .map_err(|e| VectorizationError::EmbeddingError(e.to_string()))?;

            if response.embeddings.len() != texts.len() {
                return Err(VectorizationError::EmbeddingError(format!(
                    "expected {} embeddings in batch {}, got {}",
                    texts.len(),
                    batch_number,
                    response.embeddings.len()
                )));
            }

            debug!(
                batch = batch_number + 1,
                texts = texts.len(),
                total_tokens = ?response.total_tokens,
                "Embedded chunk batch"
            );
            vectors.extend(response.embeddings);
        }

        Ok(vectors)
    }
}
