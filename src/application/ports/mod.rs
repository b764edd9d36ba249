pub mod chat_model;
pub mod content_fetcher;
pub mod document_extractor;
pub mod embedding_provider;
pub mod vector_store;

pub use chat_model::ChatModel;
pub use content_fetcher::ContentFetcher;
pub use document_extractor::DocumentExtractor;
pub use embedding_provider::EmbeddingProvider;
pub use vector_store::VectorStore;
