use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::repositories::document_repository::{DOCUMENTS_TABLE, DOCUMENTS_TABLE_DDL};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitDatabaseResponse {
    pub success: bool,
    pub message: String,
}

pub struct InitDatabaseUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl InitDatabaseUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            document_repository,
        }
    }

    pub async fn execute(&self) -> Result<InitDatabaseResponse, DocumentRepositoryError> {
        info!("Initializing database");

        self.document_repository.ping().await?;

        if self.document_repository.table_exists(DOCUMENTS_TABLE).await? {
            return Ok(InitDatabaseResponse {
                success: true,
                message: "Database already initialized".to_string(),
            });
        }

        if self.document_repository.ensure_schema().await? {
            info!(table = DOCUMENTS_TABLE, "Created table");
            Ok(InitDatabaseResponse {
                success: true,
                message: "Database initialized successfully".to_string(),
            })
        } else {
            warn!(
                table = DOCUMENTS_TABLE,
                ddl = DOCUMENTS_TABLE_DDL,
                "Could not create table, create it manually"
            );
            Ok(InitDatabaseResponse {
                success: false,
                message: format!(
                    "Could not create the {} table automatically; create it manually",
                    DOCUMENTS_TABLE
                ),
            })
        }
    }
}
