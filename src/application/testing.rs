//! In-memory port implementations shared by the application tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::application::ports::chat_model::{
    AssistantTurn, ChatMessage, ChatModel, ChatModelError, ToolDefinition,
};
use crate::application::ports::content_fetcher::{
    ContentFetchError, ContentFetcher, FetchedContent,
};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
};
use crate::application::ports::vector_store::{
    VectorMatch, VectorRecord, VectorStore, VectorStoreError,
};
use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::domain::value_objects::DocumentType;

pub struct FakeEmbeddingProvider {
    credential_valid: bool,
    fail_requests: bool,
    batch_calls: AtomicUsize,
}

impl FakeEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            credential_valid: true,
            fail_requests: false,
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_invalid_credential() -> Self {
        Self {
            credential_valid: false,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_requests: true,
            ..Self::new()
        }
    }

    pub fn embed(text: &str) -> Vector {
        Vector::from(vec![text.len() as f32, text.split_whitespace().count() as f32, 1.0])
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    fn validate_credentials(&self) -> Result<(), EmbeddingProviderError> {
        if self.credential_valid {
            Ok(())
        } else {
            Err(EmbeddingProviderError::InvalidCredential)
        }
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vector, EmbeddingProviderError> {
        if self.fail_requests {
            return Err(EmbeddingProviderError::ApiError("boom".to_string()));
        }
        Ok(Self::embed(text))
    }

    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_requests {
            return Err(EmbeddingProviderError::ApiError("boom".to_string()));
        }
        Ok(BatchEmbeddingResponse {
            embeddings: texts.iter().map(|t| Self::embed(t)).collect(),
            total_tokens: None,
        })
    }
}

pub struct InMemoryVectorStore {
    records: Mutex<Vec<VectorRecord>>,
    fail: bool,
    ensure_calls: AtomicUsize,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: false,
            ensure_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn records(&self) -> Vec<VectorRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_index(&self) -> Result<(), VectorStoreError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VectorStoreError::IndexCreation("unavailable".to_string()));
        }
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::Upsert("unavailable".to_string()));
        }
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.retain(|existing| existing.id != record.id);
            stored.push(record.clone());
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        _vector: &Vector,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::Query("unavailable".to_string()));
        }
        let stored = self.records.lock().unwrap();
        Ok(stored
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(rank, record)| {
                let metadata = match serde_json::to_value(&record.metadata) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                VectorMatch {
                    id: record.id.clone(),
                    score: 0.9 - rank as f32 * 0.05,
                    metadata,
                }
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    unavailable: bool,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), DocumentRepositoryError> {
        if self.unavailable {
            return Err(DocumentRepositoryError::ConnectionError(
                "no database backend reachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn ping(&self) -> Result<(), DocumentRepositoryError> {
        self.check()
    }

    async fn table_exists(&self, _table: &str) -> Result<bool, DocumentRepositoryError> {
        self.check()?;
        Ok(true)
    }

    async fn ensure_schema(&self) -> Result<bool, DocumentRepositoryError> {
        self.check()?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.check()?;
        let mut documents = self.documents();
        documents.reverse();
        Ok(documents)
    }

    async fn create(&self, document: &NewDocument) -> Result<Document, DocumentRepositoryError> {
        self.check()?;
        document
            .validate()
            .map_err(DocumentRepositoryError::ValidationError)?;
        let now = Utc::now();
        let created = Document::restore(
            Uuid::new_v4(),
            document.filename.clone(),
            document.document_type,
            document.content.clone(),
            document.url.clone(),
            Some(now),
            Some(now),
        );
        self.documents.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|document| document.id() != id);
        Ok(documents.len() != before)
    }
}

/// Decodes bytes as UTF-8 for every type.
pub struct Utf8Extractor;

#[async_trait]
impl DocumentExtractor for Utf8Extractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        ExtractedContent::new(String::from_utf8_lossy(data).into_owned(), document_type).non_empty()
    }

    fn can_extract(&self, _document_type: DocumentType) -> bool {
        true
    }
}

/// Replays a fixed script of assistant turns and records what it was sent.
pub struct ScriptedChatModel {
    turns: Mutex<Vec<AssistantTurn>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new(mut turns: Vec<AssistantTurn>) -> Self {
        turns.reverse();
        Self {
            turns: Mutex::new(turns),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatModelError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ChatModelError::ApiError("script exhausted".to_string()))
    }
}

/// Answers every URL with the same body, or 404 when there is none.
pub struct StaticFetcher {
    pub response: Option<FetchedContent>,
}

impl StaticFetcher {
    pub fn serving(body: &str, content_type: &str) -> Self {
        Self {
            response: Some(FetchedContent {
                body: body.as_bytes().to_vec(),
                content_type: Some(content_type.to_string()),
            }),
        }
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedContent, ContentFetchError> {
        self.response.clone().ok_or(ContentFetchError::BadStatus(404))
    }
}
