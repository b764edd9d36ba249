use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::info;

use crate::application::ports::content_fetcher::{ContentFetchError, ContentFetcher, FetchedContent};

pub const FETCH_TIMEOUT_SECS: u64 = 30;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct WebContentFetcher {
    client: Client,
    max_bytes: usize,
}

impl WebContentFetcher {
    pub fn new(max_bytes: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ContentFetcher for WebContentFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, ContentFetchError> {
        let parsed =
            url::Url::parse(url).map_err(|_| ContentFetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ContentFetchError::InvalidUrl(url.to_string()));
        }

        let mut response = self
            .client
            .get(parsed)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| ContentFetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentFetchError::BadStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if response
            .content_length()
            .is_some_and(|length| length > self.max_bytes as u64)
        {
            return Err(ContentFetchError::TooLarge(self.max_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ContentFetchError::RequestFailed(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(ContentFetchError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }
        if body.is_empty() {
            return Err(ContentFetchError::EmptyBody);
        }

        info!(url, bytes = body.len(), content_type = ?content_type, "Fetched remote content");

        Ok(FetchedContent { body, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIMIT: usize = 1024;

    fn fetcher() -> WebContentFetcher {
        WebContentFetcher::new(LIMIT).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header_exists("user-agent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>hello</p>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetched = fetcher()
            .fetch(&format!("{}/article", server.uri()))
            .await
            .unwrap();

        assert_eq!(fetched.body, b"<p>hello</p>");
        assert_eq!(fetched.content_type.as_deref(), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher().fetch(&server.uri()).await;
        assert!(matches!(result, Err(ContentFetchError::BadStatus(404))));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = fetcher().fetch(&server.uri()).await;
        assert!(matches!(result, Err(ContentFetchError::EmptyBody)));
    }

    #[tokio::test]
    async fn test_body_over_the_limit_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/large"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(LIMIT + 1)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exact"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(LIMIT)))
            .mount(&server)
            .await;

        let result = fetcher().fetch(&format!("{}/large", server.uri())).await;
        assert!(matches!(result, Err(ContentFetchError::TooLarge(LIMIT))));

        let fetched = fetcher()
            .fetch(&format!("{}/exact", server.uri()))
            .await
            .unwrap();
        assert_eq!(fetched.body.len(), LIMIT);
    }

    #[tokio::test]
    async fn test_non_http_scheme_is_rejected() {
        let result = fetcher()
            .fetch("ftp://example.com/file.txt")
            .await;
        assert!(matches!(result, Err(ContentFetchError::InvalidUrl(_))));
    }
}
