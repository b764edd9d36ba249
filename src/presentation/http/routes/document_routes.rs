use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route(
            "/db",
            get(DocumentHandler::database_action).post(DocumentHandler::create_document),
        )
        .with_state(document_handler)
}
