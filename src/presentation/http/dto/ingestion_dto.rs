use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::process_url::ProcessUrlResponse;
use crate::application::use_cases::upload_file::UploadFileResponse;
use crate::domain::value_objects::DocumentType;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponseDto {
    pub success: bool,
    pub document_id: Uuid,
    pub file_name: String,
    pub document_type: DocumentType,
    pub vectorized: bool,
    pub message: String,
}

impl From<UploadFileResponse> for UploadResponseDto {
    fn from(response: UploadFileResponse) -> Self {
        Self {
            success: true,
            document_id: response.document_id,
            file_name: response.file_name,
            document_type: response.document_type,
            vectorized: response.vectorized,
            message: response.message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessUrlRequestDto {
    pub url: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessUrlResponseDto {
    pub success: bool,
    pub document_id: Uuid,
    pub file_name: String,
    pub url: String,
    pub document_type: DocumentType,
    pub vectorized: bool,
    pub message: String,
}

impl From<ProcessUrlResponse> for ProcessUrlResponseDto {
    fn from(response: ProcessUrlResponse) -> Self {
        Self {
            success: true,
            document_id: response.document_id,
            file_name: response.file_name,
            url: response.url,
            document_type: response.document_type,
            vectorized: response.vectorized,
            message: response.message,
        }
    }
}
