use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ContentFetchError {
    #[error("Invalid URL, it must start with http:// or https://: {0}")]
    InvalidUrl(String),
    #[error("Could not fetch URL: {0}")]
    RequestFailed(String),
    #[error("Fetching URL failed with status code {0}")]
    BadStatus(u16),
    #[error("URL returned no content")]
    EmptyBody,
    #[error("URL content exceeds the {0} byte limit")]
    TooLarge(usize),
}

#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Reads a remote document for ingestion.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, ContentFetchError>;
}
