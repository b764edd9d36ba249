use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
};
use crate::infrastructure::config::EmbeddingConfig;

const KEY_PREFIX: &str = "sk-";

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub base_delay: Duration,
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt as i32 - 1);
        Duration::from_millis((factor * self.base_delay.as_millis() as f64) as u64)
    }
}

#[derive(Debug)]
enum RequestFailure {
    /// Worth another attempt: network trouble, 429 or 5xx.
    Transient(EmbeddingProviderError),
    Fatal(EmbeddingProviderError),
}

/// Embeddings over an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_factor: config.backoff_factor,
                base_delay: Duration::from_secs(1),
            },
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn api_key(&self) -> Result<&str, EmbeddingProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(EmbeddingProviderError::MissingCredential)?;
        if !key.starts_with(KEY_PREFIX) {
            return Err(EmbeddingProviderError::InvalidCredential);
        }
        Ok(key)
    }

    async fn send_request(&self, texts: &[String]) -> Result<EmbeddingsResponse, EmbeddingProviderError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(texts).await {
                Ok(response) => return Ok(response),
                Err(RequestFailure::Fatal(e)) => return Err(e),
                Err(RequestFailure::Transient(e)) => {
                    if attempts > self.retry.max_retries {
                        return Err(e);
                    }

                    let backoff_time = self.retry.delay(attempts);
                    warn!(
                        attempt = attempts,
                        backoff_ms = backoff_time.as_millis() as u64,
                        error = %e,
                        "Embedding request failed, retrying"
                    );
                    tokio::time::sleep(backoff_time).await;
                }
            }
        }
    }

    async fn execute_request(&self, texts: &[String]) -> Result<EmbeddingsResponse, RequestFailure> {
        let api_key = self.api_key().map_err(RequestFailure::Fatal)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                RequestFailure::Transient(EmbeddingProviderError::NetworkError(
                    e.without_url().to_string(),
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingProviderError::ApiError(format!("{}: {}", status, body));
            return Err(
                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    RequestFailure::Transient(error)
                } else {
                    RequestFailure::Fatal(error)
                },
            );
        }

        response.json::<EmbeddingsResponse>().await.map_err(|e| {
            RequestFailure::Fatal(EmbeddingProviderError::ApiError(format!(
                "Failed to parse embeddings response: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn validate_credentials(&self) -> Result<(), EmbeddingProviderError> {
        self.api_key().map(|_| ())
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vector, EmbeddingProviderError> {
        let response = self.generate_embeddings(&[text.to_string()]).await?;

        response.embeddings.into_iter().next().ok_or_else(|| {
            EmbeddingProviderError::ApiError("No embeddings returned".to_string())
        })
    }

    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if texts.is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "no texts to embed".to_string(),
            ));
        }

        let mut response = self.send_request(texts).await?;

        if response.data.len() != texts.len() {
            return Err(EmbeddingProviderError::ApiError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        response.data.sort_by_key(|d| d.index);

        Ok(BatchEmbeddingResponse {
            embeddings: response
                .data
                .into_iter()
                .map(|d| Vector::from(d.embedding))
                .collect(),
            total_tokens: response.usage.and_then(|u| u.total_tokens),
        })
    }
}
