use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::application::ports::vector_store::{
    ChunkMetadata, VectorMatch, VectorRecord, VectorStore, VectorStoreError,
};
use crate::infrastructure::config::PineconeConfig;

pub const API_VERSION: &str = "2024-07";
pub const UPSERT_BATCH_SIZE: usize = 32;

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    host: Option<String>,
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    state: Option<String>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a ChunkMetadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: Option<usize>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Map<String, Value>,
}

/// Serverless Pinecone index: control plane for index lifecycle, data plane
/// host for vectors.
pub struct PineconeClient {
    client: Client,
    config: PineconeConfig,
    host: OnceCell<String>,
    index_ready: OnceCell<()>,
}

impl PineconeClient {
    pub fn new(config: PineconeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let host = match config.host.as_deref() {
            Some(host) => OnceCell::new_with(Some(normalize_host(host))),
            None => OnceCell::new(),
        };

        Ok(Self {
            client,
            config,
            host,
            index_ready: OnceCell::new(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, VectorStoreError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            VectorStoreError::Configuration("PINECONE_API_KEY is not set".to_string())
        })?;
        Ok(request
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION))
    }

    fn controller(&self, path: &str) -> String {
        format!("{}/{}", self.config.controller_url.trim_end_matches('/'), path)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>, VectorStoreError> {
        let response = send(self.authorized(self.client.get(self.controller("indexes")))?).await?;
        let response = ok_or_error(response, VectorStoreError::IndexCreation).await?;
        let list: IndexList = response
            .json()
            .await
            .map_err(|e| VectorStoreError::IndexCreation(e.to_string()))?;
        Ok(list.indexes)
    }

    async fn describe_index(&self) -> Result<IndexDescription, VectorStoreError> {
        let url = self.controller(&format!("indexes/{}", self.config.index_name));
        let response = send(self.authorized(self.client.get(url))?).await?;
        let response = ok_or_error(response, VectorStoreError::IndexCreation).await?;
        response
            .json()
            .await
            .map_err(|e| VectorStoreError::IndexCreation(e.to_string()))
    }

    async fn create_index(&self) -> Result<(), VectorStoreError> {
        info!(
            index = %self.config.index_name,
            dimension = self.config.dimension,
            "Creating vector index"
        );

        let body = json!({
            "name": self.config.index_name,
            "dimension": self.config.dimension,
            "metric": "cosine",
            "spec": {
                "serverless": {
                    "cloud": self.config.cloud,
                    "region": self.config.region,
                }
            }
        });

        let request = self.client.post(self.controller("indexes")).json(&body);
        let response = send(self.authorized(request)?).await?;

        // another process may have created it in the meantime
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        ok_or_error(response, VectorStoreError::IndexCreation).await?;
        Ok(())
    }

    /// Records the data plane host once the index reports ready.
    async fn check_ready(&self) -> Result<bool, VectorStoreError> {
        let description = self.describe_index().await?;
        let status = description.status.as_ref();
        if status.is_some_and(|s| s.ready) {
            if let Some(host) = description.host.as_deref() {
                let _ = self.host.set(normalize_host(host));
            }
            return Ok(true);
        }

        info!(
            state = status.and_then(|s| s.state.as_deref()).unwrap_or("unknown"),
            "Vector index is not ready"
        );
        Ok(false)
    }

    async fn wait_until_ready(&self) -> Result<bool, VectorStoreError> {
        let interval = Duration::from_secs(self.config.ready_poll_interval_secs);
        let attempts = self.config.ready_poll_attempts;

        for attempt in 1..=attempts {
            if self.check_ready().await? {
                return Ok(true);
            }
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Ok(false)
    }

    async fn data_plane_host(&self) -> Result<&str, VectorStoreError> {
        self.host
            .get_or_try_init(|| async {
                let description = self.describe_index().await?;
                description
                    .host
                    .as_deref()
                    .map(normalize_host)
                    .ok_or_else(|| {
                        VectorStoreError::Configuration(format!(
                            "index {} reports no host",
                            self.config.index_name
                        ))
                    })
            })
            .await
            .map(String::as_str)
    }

    async fn upsert_batch(&self, host: &str, batch: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        let vectors: Vec<UpsertVector> = batch
            .iter()
            .map(|record| UpsertVector {
                id: &record.id,
                values: record.values.as_slice(),
                metadata: &record.metadata,
            })
            .collect();

        let request = self
            .client
            .post(format!("{}/vectors/upsert", host))
            .json(&json!({ "vectors": vectors, "namespace": self.config.namespace }));
        let response = send(self.authorized(request)?).await?;
        let response = ok_or_error(response, VectorStoreError::Upsert).await?;
        let body: UpsertResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;

        Ok(body.upserted_count.unwrap_or(batch.len()))
    }
}

#[async_trait]
impl VectorStore for PineconeClient {
    async fn ensure_index(&self) -> Result<(), VectorStoreError> {
        if self.index_ready.initialized() {
            return Ok(());
        }

        let exists = self
            .list_indexes()
            .await?
            .iter()
            .any(|index| index.name == self.config.index_name);

        // only a freshly created index is polled
        let ready = if exists {
            self.check_ready().await?
        } else {
            self.create_index().await?;
            self.wait_until_ready().await?
        };

        if ready {
            let _ = self.index_ready.set(());
        } else {
            warn!(
                index = %self.config.index_name,
                "Vector index is not ready yet, continuing anyway"
            );
        }

        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let host = self.data_plane_host().await?;
        let mut upserted = 0;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            upserted += self.upsert_batch(host, batch).await?;
        }

        info!(records = records.len(), upserted, "Vectors upserted");
        Ok(upserted)
    }

    async fn query(
        &self,
        vector: &Vector,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, VectorStoreError> {
        let host = self.data_plane_host().await?;
        let body = json!({
            "vector": vector.as_slice(),
            "topK": top_k,
            "includeMetadata": true,
            "namespace": self.config.namespace,
        });

        let request = self.client.post(format!("{}/query", host)).json(&body);
        let response = send(self.authorized(request)?).await?;
        let response = ok_or_error(response, VectorStoreError::Query).await?;
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Query(e.to_string()))?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, VectorStoreError> {
    request
        .send()
        .await
        .map_err(|e| VectorStoreError::NetworkError(e.without_url().to_string()))
}

async fn ok_or_error(
    response: Response,
    to_error: fn(String) -> VectorStoreError,
) -> Result<Response, VectorStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(to_error(format!("{}: {}", status, body)))
}
