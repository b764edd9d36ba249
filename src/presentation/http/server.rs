use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::presentation::http::{
    dto::ApiResponse,
    handlers::{ChatHandler, DocumentHandler, IngestionHandler},
    routes::{chat_routes, document_routes, health_routes, ingestion_routes},
};

/// Headroom on top of the largest accepted file for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub struct HttpServer {
    document_handler: Arc<DocumentHandler>,
    ingestion_handler: Arc<IngestionHandler>,
    chat_handler: Arc<ChatHandler>,
    port: u16,
    max_upload_bytes: usize,
}

impl HttpServer {
    pub fn new(
        document_handler: Arc<DocumentHandler>,
        ingestion_handler: Arc<IngestionHandler>,
        chat_handler: Arc<ChatHandler>,
        port: u16,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            document_handler,
            ingestion_handler,
            chat_handler,
            port,
            max_upload_bytes,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes())
            .merge(document_routes(self.document_handler.clone()))
            .merge(ingestion_routes(self.ingestion_handler.clone()))
            .merge(chat_routes(self.chat_handler.clone()))
            .layer(cors)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(
                self.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
            ))
            .layer(map_response(payload_too_large_as_json))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                method = %request.method(),
                                uri = %request.uri(),
                                "Received request"
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                status = %response.status(),
                                latency_ms = latency.as_millis() as u64,
                                "Response sent"
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                error = ?error,
                                latency_ms = latency.as_millis() as u64,
                                "Request failed"
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "HTTP server listening");
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn payload_too_large_as_json(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(ApiResponse::<()>::error("Request body is too large")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::ports::chat_model::AssistantTurn;
    use crate::application::testing::{
        FakeEmbeddingProvider, InMemoryDocumentRepository, InMemoryVectorStore,
        ScriptedChatModel, StaticFetcher, Utf8Extractor,
    };
    use crate::domain::repositories::DocumentRepository;
    use crate::infrastructure::container::{AppContainer, AppPorts};

    const BOUNDARY: &str = "XBOUNDARYX";

    fn app_with(repository: Arc<dyn DocumentRepository>, turns: Vec<AssistantTurn>) -> Router {
        let ports = AppPorts {
            document_repository: repository,
            document_extractor: Arc::new(Utf8Extractor),
            embedding_provider: Arc::new(FakeEmbeddingProvider::new()),
            vector_store: Arc::new(InMemoryVectorStore::new()),
            content_fetcher: Arc::new(StaticFetcher::serving(
                "<p>Our refund window is thirty days from delivery.</p>",
                "text/plain",
            )),
            chat_model: Arc::new(ScriptedChatModel::new(turns)),
        };
        AppContainer::assemble(ports, 0, 1024).http_server().router()
    }

    fn app() -> Router {
        app_with(Arc::new(InMemoryDocumentRepository::new()), vec![])
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(field: &str, file_name: &str, content_type: &str, data: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n{data}\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_db_defaults_to_init() {
        let (status, body) = send(&app(), get("/db")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Database already initialized");
    }

    #[tokio::test]
    async fn test_db_rejects_unknown_action_and_bad_ids() {
        let app = app();

        let (status, body) = send(&app, get("/db?action=drop")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("drop"));

        let (status, _) = send(&app, get("/db?action=delete")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/db?action=delete&id=not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_list_and_delete_documents() {
        let app = app();

        let (status, _) = send(&app, post_json("/db", json!({ "filename": "a.txt" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = send(
            &app,
            post_json(
                "/db",
                json!({ "filename": "a.txt", "type": "text", "content": "hello" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["filename"], "a.txt");
        assert_eq!(created["data"]["type"], "text");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&app, get("/db?action=documents")).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let (status, deleted) = send(&app, get(&format!("/db?action=delete&id={}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "Document deleted");

        let (status, again) = send(&app, get(&format!("/db?action=delete&id={}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["message"], "Document not found, nothing to delete");
    }

    #[tokio::test]
    async fn test_created_document_keeps_only_a_preview() {
        let (status, created) = send(
            &app(),
            post_json(
                "/db",
                json!({ "filename": "long.txt", "type": "text", "content": "b".repeat(2000) }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let content = created["data"]["content"].as_str().unwrap();
        assert_eq!(content.chars().count(), 503);
        assert!(content.ends_with("..."));
    }

    #[tokio::test]
    async fn test_oversized_body_gets_json_413() {
        let length = 1024 + MULTIPART_OVERHEAD_BYTES + 10;
        let request = Request::builder()
            .method("POST")
            .uri("/db")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, length)
            .body(Body::from(vec![b' '; length]))
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Request body is too large");
    }

    #[tokio::test]
    async fn test_unavailable_database_is_503() {
        let app = app_with(Arc::new(InMemoryDocumentRepository::unavailable()), vec![]);
        let (status, body) = send(&app, get("/db?action=documents")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_upload_stores_and_vectorizes() {
        let (status, body) = send(
            &app(),
            upload(
                "file",
                "notes.txt",
                "text/plain",
                "Shipping takes five business days within the country.",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["fileName"], "notes.txt");
        assert_eq!(body["vectorized"], true);
        assert_eq!(body["message"], "File fully processed");
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = app();

        let (status, _) = send(&app, upload("file", "cat.png", "image/png", "not text")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, upload("attachment", "a.txt", "text/plain", "x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");

        let oversized = "a".repeat(2048);
        let (status, _) = send(&app, upload("file", "big.txt", "text/plain", &oversized)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_process_url() {
        let app = app();

        let (status, _) =
            send(&app, post_json("/process-url", json!({ "url": "https://example.com" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_json(
                "/process-url",
                json!({ "url": "ftp://example.com", "fileName": "page" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post_json(
                "/process-url",
                json!({ "url": "https://example.com/refunds", "fileName": "refunds" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["url"], "https://example.com/refunds");
        assert_eq!(body["message"], "URL processed successfully");
    }

    #[tokio::test]
    async fn test_chat_streams_events() {
        let app = app_with(
            Arc::new(InMemoryDocumentRepository::new()),
            vec![AssistantTurn {
                content: Some("Hello there".to_string()),
                tool_calls: vec![],
                finish_reason: Some("stop".to_string()),
            }],
        );

        let response = app
            .clone()
            .oneshot(post_json(
                "/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("event: text"));
        assert!(text.contains("\"content\":\"Hello there\""));
        assert!(text.contains("event: finish"));
    }

    #[tokio::test]
    async fn test_chat_without_messages_is_rejected() {
        let (status, body) = send(&app(), post_json("/chat", json!({ "messages": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
