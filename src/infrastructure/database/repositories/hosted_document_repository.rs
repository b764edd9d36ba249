use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::document_repository::{DOCUMENTS_TABLE, DOCUMENTS_TABLE_DDL};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::domain::value_objects::DocumentType;

pub const HOSTED_TIMEOUT_SECS: u64 = 20;

/// Error codes PostgREST uses for a table that is not there.
const MISSING_TABLE_CODES: [&str; 2] = ["42P01", "PGRST205"];

const PROBE_TABLE: &str = "_nonexistent_table_";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentRow {
    id: Uuid,
    filename: String,
    #[serde(rename = "type")]
    document_type: Option<String>,
    content: Option<String>,
    url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::restore(
            row.id,
            row.filename,
            row.document_type
                .as_deref()
                .map(DocumentType::from_tag)
                .unwrap_or_default(),
            row.content,
            row.url,
            row.created_at,
            row.updated_at,
        )
    }
}

enum ApiFailure {
    MissingTable,
    Other(String),
}

/// Documents table through a hosted PostgREST endpoint (Supabase).
pub struct HostedDocumentRepository {
    client: Client,
    base_url: String,
}

impl HostedDocumentRepository {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, DocumentRepositoryError> {
        let invalid_key =
            |_| DocumentRepositoryError::ConnectionError("invalid hosted API key".to_string());

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid_key)?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(HOSTED_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| DocumentRepositoryError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DocumentRepositoryError> {
        request
            .send()
            .await
            .map_err(|e| DocumentRepositoryError::ConnectionError(e.without_url().to_string()))
    }

    async fn failure(response: Response) -> ApiFailure {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err)
                if err
                    .code
                    .as_deref()
                    .is_some_and(|code| MISSING_TABLE_CODES.contains(&code)) =>
            {
                ApiFailure::MissingTable
            }
            Ok(err) => ApiFailure::Other(format!(
                "{} ({})",
                err.message.unwrap_or_else(|| status.to_string()),
                err.code.unwrap_or_default()
            )),
            Err(_) => ApiFailure::Other(format!("{}: {}", status, body)),
        }
    }

    async fn expect_success(response: Response) -> Result<Response, DocumentRepositoryError> {
        if response.status().is_success() {
            return Ok(response);
        }
        match Self::failure(response).await {
            ApiFailure::MissingTable => Err(DocumentRepositoryError::MissingTable(
                DOCUMENTS_TABLE.to_string(),
            )),
            ApiFailure::Other(message) => Err(DocumentRepositoryError::DatabaseError(message)),
        }
    }

    async fn rows(response: Response) -> Result<Vec<Document>, DocumentRepositoryError> {
        let rows: Vec<DocumentRow> = Self::expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn rpc(&self, function: &str, body: serde_json::Value) -> Result<(), String> {
        let response = self
            .send(self.client.post(self.rest_url(&format!("rpc/{}", function))).json(&body))
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            return Ok(());
        }
        match Self::failure(response).await {
            ApiFailure::MissingTable => Err(format!("{} reported a missing table", function)),
            ApiFailure::Other(message) => Err(message),
        }
    }
}

#[async_trait]
impl DocumentRepository for HostedDocumentRepository {
    /// Queries a table that cannot exist: a "missing table" answer proves the
    /// endpoint and key work.
    async fn ping(&self) -> Result<(), DocumentRepositoryError> {
        let response = self
            .send(
                self.client
                    .get(self.rest_url(PROBE_TABLE))
                    .query(&[("select", "count"), ("limit", "1")]),
            )
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        match Self::failure(response).await {
            ApiFailure::MissingTable => Ok(()),
            ApiFailure::Other(message) => Err(DocumentRepositoryError::ConnectionError(message)),
        }
    }

    async fn table_exists(&self, table: &str) -> Result<bool, DocumentRepositoryError> {
        let response = self
            .send(
                self.client
                    .get(self.rest_url(table))
                    .query(&[("select", "id"), ("limit", "1")]),
            )
            .await?;

        if response.status().is_success() {
            return Ok(true);
        }
        match Self::failure(response).await {
            ApiFailure::MissingTable => Ok(false),
            ApiFailure::Other(message) => Err(DocumentRepositoryError::DatabaseError(message)),
        }
    }

    async fn ensure_schema(&self) -> Result<bool, DocumentRepositoryError> {
        match self.rpc("create_documents_table", json!({})).await {
            Ok(()) => {
                info!("Created documents table via create_documents_table");
                return Ok(true);
            }
            Err(e) => warn!(error = %e, "create_documents_table failed, trying exec_sql"),
        }

        match self.rpc("exec_sql", json!({ "sql": DOCUMENTS_TABLE_DDL })).await {
            Ok(()) => {
                info!("Created documents table via exec_sql");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "exec_sql failed, documents table not created");
                Ok(false)
            }
        }
    }

    async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        let response = self
            .send(
                self.client
                    .get(self.rest_url(DOCUMENTS_TABLE))
                    .query(&[("select", "*"), ("order", "created_at.desc")]),
            )
            .await?;
        Self::rows(response).await
    }

    async fn create(&self, document: &NewDocument) -> Result<Document, DocumentRepositoryError> {
        document
            .validate()
            .map_err(DocumentRepositoryError::ValidationError)?;

        let response = self
            .send(
                self.client
                    .post(self.rest_url(DOCUMENTS_TABLE))
                    .header("Prefer", "return=representation")
                    .json(document),
            )
            .await?;

        Self::rows(response).await?.into_iter().next().ok_or_else(|| {
            DocumentRepositoryError::DatabaseError("insert returned no row".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let response = self
            .send(
                self.client
                    .delete(self.rest_url(DOCUMENTS_TABLE))
                    .header("Prefer", "return=representation")
                    .query(&[("id", format!("eq.{}", id))]),
            )
            .await?;
        Ok(!Self::rows(response).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(id: Uuid, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "filename": name,
            "type": "pdf",
            "content": "preview",
            "url": null,
            "created_at": "2024-06-01T12:00:00.123456+00:00",
            "updated_at": "2024-06-01T12:00:00.123456+00:00"
        })
    }

    fn missing_table() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({
            "code": "42P01",
            "message": "relation \"public._nonexistent_table_\" does not exist"
        }))
    }

    #[tokio::test]
    async fn test_ping_accepts_missing_table_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/_nonexistent_table_"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(missing_table())
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        repository.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_rejects_bad_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "wrong").unwrap();
        let result = repository.ping().await;
        assert!(matches!(result, Err(DocumentRepositoryError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_table_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/other"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "PGRST205",
                "message": "Could not find the table 'public.other' in the schema cache"
            })))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        assert!(repository.table_exists("documents").await.unwrap());
        assert!(!repository.table_exists("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/rest/v1/documents"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(id, "a.pdf")])))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        let documents = repository.list().await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id(), id);
        assert_eq!(documents[0].document_type(), DocumentType::Pdf);
        assert!(documents[0].created_at().is_some());
    }

    #[tokio::test]
    async fn test_list_reports_missing_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/documents"))
            .respond_with(missing_table())
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        let result = repository.list().await;
        assert!(matches!(result, Err(DocumentRepositoryError::MissingTable(_))));
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/rest/v1/documents"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"filename": "a.pdf", "type": "pdf", "content": "preview"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(id, "a.pdf")])))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        let document = repository
            .create(&NewDocument::new("a.pdf", DocumentType::Pdf).with_content(Some("preview".into())))
            .await
            .unwrap();

        assert_eq!(document.id(), id);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_went_away() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/documents"))
            .and(query_param("id", format!("eq.{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(id, "a.pdf")])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        assert!(repository.delete(id).await.unwrap());
        assert!(!repository.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_schema_falls_back_to_exec_sql() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/create_documents_table"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "PGRST202",
                "message": "Could not find the function"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/exec_sql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .expect(1)
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        assert!(repository.ensure_schema().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_schema_gives_up_quietly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "permission denied"
            })))
            .mount(&server)
            .await;

        let repository = HostedDocumentRepository::new(&server.uri(), "anon").unwrap();
        assert!(!repository.ensure_schema().await.unwrap());
    }
}
