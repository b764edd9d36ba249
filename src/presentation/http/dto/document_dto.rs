use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::create_document::CreateDocumentRequest;
use crate::domain::entities::Document;
use crate::domain::value_objects::DocumentType;

#[derive(Debug, Serialize)]
pub struct DocumentDto {
    pub id: Uuid,
    pub filename: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub content: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Document> for DocumentDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id(),
            filename: document.filename().to_string(),
            document_type: document.document_type(),
            content: document.content().map(str::to_string),
            url: document.url().map(str::to_string),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        }
    }
}

/// Query string of `GET /db`.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseActionQuery {
    pub action: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentDto {
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

impl From<CreateDocumentDto> for CreateDocumentRequest {
    fn from(dto: CreateDocumentDto) -> Self {
        Self {
            filename: dto.filename,
            document_type: dto.document_type,
            content: dto.content,
            url: dto.url,
        }
    }
}
