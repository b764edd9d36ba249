use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::IngestionHandler;

pub fn ingestion_routes(ingestion_handler: Arc<IngestionHandler>) -> Router {
    Router::new()
        .route("/upload", post(IngestionHandler::upload_file))
        .route("/process-url", post(IngestionHandler::process_url))
        .with_state(ingestion_handler)
}
