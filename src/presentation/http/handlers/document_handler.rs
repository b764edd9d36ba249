use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::use_cases::{
    CreateDocumentUseCase, DeleteDocumentUseCase, InitDatabaseUseCase, ListDocumentsUseCase,
};
use crate::presentation::http::dto::{ApiResponse, CreateDocumentDto, DatabaseActionQuery, DocumentDto};
use crate::presentation::http::errors::AppError;

pub struct DocumentHandler {
    init_database_use_case: Arc<InitDatabaseUseCase>,
    list_documents_use_case: Arc<ListDocumentsUseCase>,
    create_document_use_case: Arc<CreateDocumentUseCase>,
    delete_document_use_case: Arc<DeleteDocumentUseCase>,
}

impl DocumentHandler {
    pub fn new(
        init_database_use_case: Arc<InitDatabaseUseCase>,
        list_documents_use_case: Arc<ListDocumentsUseCase>,
        create_document_use_case: Arc<CreateDocumentUseCase>,
        delete_document_use_case: Arc<DeleteDocumentUseCase>,
    ) -> Self {
        Self {
            init_database_use_case,
            list_documents_use_case,
            create_document_use_case,
            delete_document_use_case,
        }
    }

    /// `GET /db?action=init|documents|delete&id=`; no action means `init`.
    pub async fn database_action(
        State(handler): State<Arc<DocumentHandler>>,
        Query(query): Query<DatabaseActionQuery>,
    ) -> Result<Response, AppError> {
        match query.action.as_deref().unwrap_or("init") {
            "init" => {
                let response = handler.init_database_use_case.execute().await?;
                let status = if response.success {
                    StatusCode::OK
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                Ok((
                    status,
                    Json(ApiResponse::message(response.success, response.message)),
                )
                    .into_response())
            }
            "documents" => {
                let documents: Vec<DocumentDto> = handler
                    .list_documents_use_case
                    .execute()
                    .await?
                    .into_iter()
                    .map(DocumentDto::from)
                    .collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(documents))).into_response())
            }
            "delete" => {
                let id = query
                    .id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| AppError::Validation("Missing document id".to_string()))?;
                let response = handler.delete_document_use_case.execute(id).await?;
                Ok((StatusCode::OK, Json(ApiResponse::message(true, response.message)))
                    .into_response())
            }
            other => Err(AppError::Validation(format!("Unknown action: {}", other))),
        }
    }

    pub async fn create_document(
        State(handler): State<Arc<DocumentHandler>>,
        payload: Result<Json<CreateDocumentDto>, JsonRejection>,
    ) -> Result<impl IntoResponse, AppError> {
        let Json(dto) = payload?;
        let document = handler.create_document_use_case.execute(dto.into()).await?;

        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(DocumentDto::from(document))),
        ))
    }
}
