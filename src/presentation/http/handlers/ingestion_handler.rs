use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    ProcessUrlUseCase, UploadFileUseCase, process_url::ProcessUrlRequest,
    upload_file::UploadFileRequest,
};
use crate::presentation::http::dto::{ProcessUrlRequestDto, ProcessUrlResponseDto, UploadResponseDto};
use crate::presentation::http::errors::AppError;

const FILE_FIELD: &str = "file";

pub struct IngestionHandler {
    upload_use_case: Arc<UploadFileUseCase>,
    process_url_use_case: Arc<ProcessUrlUseCase>,
}

impl IngestionHandler {
    pub fn new(
        upload_use_case: Arc<UploadFileUseCase>,
        process_url_use_case: Arc<ProcessUrlUseCase>,
    ) -> Self {
        Self {
            upload_use_case,
            process_url_use_case,
        }
    }

    pub async fn upload_file(
        State(handler): State<Arc<IngestionHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(|ct| ct.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {}", e)))?
                .to_vec();

            let request = UploadFileRequest {
                file_name,
                file_data: data,
                content_type,
            };

            let response = handler.upload_use_case.execute(request).await?;
            return Ok((StatusCode::CREATED, Json(UploadResponseDto::from(response))));
        }

        Err(AppError::Validation("No file provided".to_string()))
    }

    pub async fn process_url(
        State(handler): State<Arc<IngestionHandler>>,
        payload: Result<Json<ProcessUrlRequestDto>, JsonRejection>,
    ) -> Result<impl IntoResponse, AppError> {
        let Json(dto) = payload?;
        let (Some(url), Some(file_name)) = (dto.url, dto.file_name) else {
            return Err(AppError::Validation(
                "Missing required fields (url, fileName)".to_string(),
            ));
        };

        let response = handler
            .process_url_use_case
            .execute(ProcessUrlRequest { url, file_name })
            .await?;

        Ok((StatusCode::CREATED, Json(ProcessUrlResponseDto::from(response))))
    }
}
