pub mod chat_completion_client;
pub mod document_extractors;
pub mod openai_embedding_client;
pub mod pinecone_client;
pub mod web_content_fetcher;

pub use chat_completion_client::ChatCompletionClient;
pub use document_extractors::CompositeDocumentExtractor;
pub use openai_embedding_client::OpenAiEmbeddingClient;
pub use pinecone_client::PineconeClient;
pub use web_content_fetcher::WebContentFetcher;
