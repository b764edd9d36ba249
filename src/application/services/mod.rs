pub mod ingestion_service;
pub mod retrieval_service;
pub mod text_chunker;
pub mod vectorization_service;

pub use ingestion_service::IngestionService;
pub use retrieval_service::RetrievalService;
pub use text_chunker::TextChunker;
pub use vectorization_service::VectorizationService;
