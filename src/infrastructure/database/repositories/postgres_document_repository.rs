use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Bool, Text};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::document_repository::DOCUMENTS_TABLE;
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::documents::dsl::*;
use crate::infrastructure::database::{
    DbPool, get_connection_from_pool, run_migrations, test_connection,
};

#[derive(QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    present: bool,
}

/// Documents table over a direct diesel connection pool. Diesel is
/// synchronous, so every call runs on the blocking pool.
pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_connection<F, T>(&self, operation: F) -> Result<T, DocumentRepositoryError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DocumentRepositoryError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| DocumentRepositoryError::ConnectionError(e.to_string()))?;
            operation(&mut conn)
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?
    }
}

fn map_diesel_error(error: DieselError) -> DocumentRepositoryError {
    match &error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentRepositoryError::ConnectionError(error.to_string())
        }
        DieselError::DatabaseError(_, info)
            if info.message().contains(DOCUMENTS_TABLE) && info.message().contains("does not exist") =>
        {
            DocumentRepositoryError::MissingTable(DOCUMENTS_TABLE.to_string())
        }
        _ => DocumentRepositoryError::DatabaseError(error.to_string()),
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn ping(&self) -> Result<(), DocumentRepositoryError> {
        self.with_connection(|conn| {
            test_connection(conn).map_err(|e| DocumentRepositoryError::ConnectionError(e.to_string()))
        })
        .await
    }

    async fn table_exists(&self, table: &str) -> Result<bool, DocumentRepositoryError> {
        let table = table.to_string();
        self.with_connection(move |conn| {
            let row: ExistsRow = diesel::sql_query(
                "SELECT EXISTS (SELECT FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_name = $1) AS present",
            )
            .bind::<Text, _>(table)
            .get_result(conn)
            .map_err(map_diesel_error)?;
            Ok(row.present)
        })
        .await
    }

    async fn ensure_schema(&self) -> Result<bool, DocumentRepositoryError> {
        self.with_connection(|conn| match run_migrations(conn) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Could not run migrations on direct connection");
                Ok(false)
            }
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.with_connection(|conn| {
            let rows = documents
                .order(created_at.desc())
                .select(DocumentModel::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Document::from).collect())
        })
        .await
    }

    async fn create(&self, document: &NewDocument) -> Result<Document, DocumentRepositoryError> {
        document
            .validate()
            .map_err(DocumentRepositoryError::ValidationError)?;

        let new_document = NewDocumentModel::from(document);
        self.with_connection(move |conn| {
            let inserted: DocumentModel = diesel::insert_into(documents)
                .values(&new_document)
                .returning(DocumentModel::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(Document::from(inserted))
        })
        .await
    }

    async fn delete(&self, document_id: Uuid) -> Result<bool, DocumentRepositoryError> {
        self.with_connection(move |conn| {
            let removed = diesel::delete(documents.find(document_id))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(removed > 0)
        })
        .await
    }
}
