use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Document, NewDocument};

pub const DOCUMENTS_TABLE: &str = "documents";

/// DDL for the documents table, for backends that cannot run migrations and
/// for operators creating the table by hand.
pub const DOCUMENTS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS documents (
  id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
  filename TEXT NOT NULL,
  type TEXT,
  content TEXT,
  url TEXT,
  created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);";

#[derive(Debug, thiserror::Error)]
pub enum DocumentRepositoryError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Table {0} does not exist; run the init action first")]
    MissingTable(String),
}

/// Persistence for document metadata rows. Implemented by both the direct
/// Postgres backend and the hosted REST backend.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Round-trips a trivial query to prove the backend is usable.
    async fn ping(&self) -> Result<(), DocumentRepositoryError>;

    async fn table_exists(&self, table: &str) -> Result<bool, DocumentRepositoryError>;

    /// Creates the documents table. Returns false when the backend could not
    /// create it (e.g. missing privileges) without failing outright.
    async fn ensure_schema(&self) -> Result<bool, DocumentRepositoryError>;

    /// All rows, newest first.
    async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError>;

    async fn create(&self, document: &NewDocument) -> Result<Document, DocumentRepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError>;
}
