use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::value_objects::DocumentType;
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub filename: String,
    pub document_type: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub filename: String,
    pub document_type: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&NewDocument> for NewDocumentModel {
    fn from(document: &NewDocument) -> Self {
        let now = Utc::now();
        Self {
            filename: document.filename.clone(),
            document_type: Some(document.document_type.as_str().to_string()),
            content: document.content.clone(),
            url: document.url.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

impl From<DocumentModel> for Document {
    fn from(model: DocumentModel) -> Self {
        Document::restore(
            model.id,
            model.filename,
            model
                .document_type
                .as_deref()
                .map(DocumentType::from_tag)
                .unwrap_or_default(),
            model.content,
            model.url,
            model.created_at,
            model.updated_at,
        )
    }
}
