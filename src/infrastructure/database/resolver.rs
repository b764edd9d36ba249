use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::infrastructure::config::DatabaseConfig;
use crate::infrastructure::database::repositories::{
    HostedDocumentRepository, PostgresDocumentRepository,
};
use crate::infrastructure::database::{PoolSettings, create_connection_pool};

pub const TEST_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// One way of reaching the documents table.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    fn name(&self) -> &'static str;

    /// False when the backend is switched off or lacks configuration.
    fn is_enabled(&self) -> bool;

    async fn connect(&self) -> Result<Arc<dyn DocumentRepository>, DocumentRepositoryError>;
}

pub struct DirectConnector {
    database_url: Option<String>,
    disabled: bool,
    settings: PoolSettings,
}

impl DirectConnector {
    pub fn new(database_url: Option<String>, disabled: bool, settings: PoolSettings) -> Self {
        Self {
            database_url,
            disabled,
            settings,
        }
    }
}

#[async_trait]
impl BackendConnector for DirectConnector {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn is_enabled(&self) -> bool {
        !self.disabled && self.database_url.is_some()
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentRepository>, DocumentRepositoryError> {
        let url = self.database_url.clone().ok_or_else(|| {
            DocumentRepositoryError::ConnectionError("no Postgres URL configured".to_string())
        })?;
        let settings = self.settings.clone();

        let pool = tokio::task::spawn_blocking(move || create_connection_pool(&url, &settings))
            .await
            .map_err(|e| DocumentRepositoryError::ConnectionError(e.to_string()))?
            .map_err(|e| DocumentRepositoryError::ConnectionError(e.to_string()))?;

        let repository = PostgresDocumentRepository::new(pool);
        tokio::time::timeout(TEST_QUERY_TIMEOUT, repository.ping())
            .await
            .map_err(|_| {
                DocumentRepositoryError::ConnectionError("connection test timed out".to_string())
            })??;

        Ok(Arc::new(repository))
    }
}

pub struct HostedConnector {
    url: Option<String>,
    key: Option<String>,
}

impl HostedConnector {
    pub fn new(url: Option<String>, key: Option<String>) -> Self {
        Self { url, key }
    }
}

#[async_trait]
impl BackendConnector for HostedConnector {
    fn name(&self) -> &'static str {
        "hosted"
    }

    fn is_enabled(&self) -> bool {
        self.url.is_some() && self.key.is_some()
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentRepository>, DocumentRepositoryError> {
        match (&self.url, &self.key) {
            (Some(url), Some(key)) => Ok(Arc::new(HostedDocumentRepository::new(url, key)?)),
            _ => Err(DocumentRepositoryError::ConnectionError(
                "hosted database URL or key missing".to_string(),
            )),
        }
    }
}

#[derive(Clone)]
enum ConnectionState {
    Unresolved,
    Direct(Arc<dyn DocumentRepository>),
    Hosted(Arc<dyn DocumentRepository>),
    Failed,
}

/// Picks the direct backend when it answers, the hosted one otherwise, and
/// remembers the choice for the life of the process. A failed resolution is
/// not remembered: the next call starts over.
pub struct ConnectionResolver {
    direct: Arc<dyn BackendConnector>,
    hosted: Arc<dyn BackendConnector>,
    state: RwLock<ConnectionState>,
}

impl ConnectionResolver {
    pub fn new(direct: Arc<dyn BackendConnector>, hosted: Arc<dyn BackendConnector>) -> Self {
        Self {
            direct,
            hosted,
            state: RwLock::new(ConnectionState::Unresolved),
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            Arc::new(DirectConnector::new(
                config.connection_string.clone(),
                config.disable_direct_connection,
                PoolSettings::default(),
            )),
            Arc::new(HostedConnector::new(
                config.hosted_url.clone(),
                config.hosted_key.clone(),
            )),
        )
    }

    /// Concurrent callers may resolve at the same time; the last one to
    /// finish wins, which is harmless.
    pub async fn resolve(&self) -> Result<Arc<dyn DocumentRepository>, DocumentRepositoryError> {
        match &*self.state.read().await {
            ConnectionState::Direct(repository) | ConnectionState::Hosted(repository) => {
                return Ok(repository.clone());
            }
            ConnectionState::Unresolved | ConnectionState::Failed => {}
        }

        let resolved = self.attempt().await;
        let mut state = self.state.write().await;
        match resolved {
            Ok(next) => {
                *state = next.clone();
                match next {
                    ConnectionState::Direct(repository) | ConnectionState::Hosted(repository) => {
                        Ok(repository)
                    }
                    _ => Err(DocumentRepositoryError::ConnectionError(
                        "no database backend resolved".to_string(),
                    )),
                }
            }
            Err(message) => {
                *state = ConnectionState::Failed;
                Err(DocumentRepositoryError::ConnectionError(message))
            }
        }
    }

    async fn attempt(&self) -> Result<ConnectionState, String> {
        let mut failures = Vec::new();

        if self.direct.is_enabled() {
            info!(backend = self.direct.name(), "Trying database backend");
            match self.direct.connect().await {
                Ok(repository) => {
                    info!(backend = self.direct.name(), "Database backend ready");
                    return Ok(ConnectionState::Direct(repository));
                }
                Err(e) => {
                    warn!(backend = self.direct.name(), error = %e, "Database backend unavailable");
                    failures.push(format!("{}: {}", self.direct.name(), e));
                }
            }
        } else {
            info!(backend = self.direct.name(), "Database backend disabled or not configured");
        }

        if self.hosted.is_enabled() {
            info!(backend = self.hosted.name(), "Trying database backend");
            match self.hosted.connect().await {
                Ok(repository) => {
                    info!(backend = self.hosted.name(), "Database backend ready");
                    return Ok(ConnectionState::Hosted(repository));
                }
                Err(e) => {
                    warn!(backend = self.hosted.name(), error = %e, "Database backend unavailable");
                    failures.push(format!("{}: {}", self.hosted.name(), e));
                }
            }
        } else {
            info!(backend = self.hosted.name(), "Database backend disabled or not configured");
        }

        if failures.is_empty() {
            Err("no database backend is configured".to_string())
        } else {
            Err(format!(
                "could not connect to any database backend ({})",
                failures.join("; ")
            ))
        }
    }
}

#[async_trait]
impl DocumentRepository for ConnectionResolver {
    async fn ping(&self) -> Result<(), DocumentRepositoryError> {
        self.resolve().await?.ping().await
    }

    async fn table_exists(&self, table: &str) -> Result<bool, DocumentRepositoryError> {
        self.resolve().await?.table_exists(table).await
    }

    async fn ensure_schema(&self) -> Result<bool, DocumentRepositoryError> {
        self.resolve().await?.ensure_schema().await
    }

    async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.resolve().await?.list().await
    }

    async fn create(&self, document: &NewDocument) -> Result<Document, DocumentRepositoryError> {
        self.resolve().await?.create(document).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        self.resolve().await?.delete(id).await
    }
}
