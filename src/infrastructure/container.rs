use std::sync::Arc;

use crate::{
    application::{
        ports::{ChatModel, ContentFetcher, DocumentExtractor, EmbeddingProvider, VectorStore},
        services::{IngestionService, RetrievalService, VectorizationService},
        use_cases::{
            AddResourceUseCase, ChatUseCase, CreateDocumentUseCase, DeleteDocumentUseCase,
            FindRelevantContentUseCase, InitDatabaseUseCase, ListDocumentsUseCase,
            ProcessUrlUseCase, UploadFileUseCase,
        },
    },
    domain::repositories::DocumentRepository,
    infrastructure::{
        config::AppConfig,
        database::ConnectionResolver,
        external_services::{
            ChatCompletionClient, CompositeDocumentExtractor, OpenAiEmbeddingClient,
            PineconeClient, WebContentFetcher,
        },
    },
    presentation::http::{
        HttpServer,
        handlers::{ChatHandler, DocumentHandler, IngestionHandler},
    },
};

/// Adapters behind every port. Production wiring builds them from config;
/// tests substitute fakes.
pub struct AppPorts {
    pub document_repository: Arc<dyn DocumentRepository>,
    pub document_extractor: Arc<dyn DocumentExtractor>,
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub vector_store: Arc<dyn VectorStore>,
    pub content_fetcher: Arc<dyn ContentFetcher>,
    pub chat_model: Arc<dyn ChatModel>,
}

pub struct AppContainer {
    pub document_repository: Arc<dyn DocumentRepository>,

    // Application Services
    pub ingestion_service: Arc<IngestionService>,
    pub retrieval_service: Arc<RetrievalService>,

    // Use Cases
    pub upload_file_use_case: Arc<UploadFileUseCase>,
    pub process_url_use_case: Arc<ProcessUrlUseCase>,
    pub init_database_use_case: Arc<InitDatabaseUseCase>,
    pub list_documents_use_case: Arc<ListDocumentsUseCase>,
    pub create_document_use_case: Arc<CreateDocumentUseCase>,
    pub delete_document_use_case: Arc<DeleteDocumentUseCase>,
    pub add_resource_use_case: Arc<AddResourceUseCase>,
    pub find_relevant_content_use_case: Arc<FindRelevantContentUseCase>,
    pub chat_use_case: Arc<ChatUseCase>,

    // HTTP Handlers
    pub document_handler: Arc<DocumentHandler>,
    pub ingestion_handler: Arc<IngestionHandler>,
    pub chat_handler: Arc<ChatHandler>,

    port: u16,
    max_upload_bytes: usize,
}

impl AppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Database backend is resolved lazily on first use
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(ConnectionResolver::from_config(&config.database));

        // Create external services
        let ports = AppPorts {
            document_repository,
            document_extractor: Arc::new(CompositeDocumentExtractor::new()),
            embedding_provider: Arc::new(OpenAiEmbeddingClient::new(&config.embedding)?),
            vector_store: Arc::new(PineconeClient::new(config.pinecone.clone())?),
            content_fetcher: Arc::new(WebContentFetcher::new(config.server.max_upload_bytes)?),
            chat_model: Arc::new(ChatCompletionClient::new(config.chat.clone())?),
        };

        Ok(Self::assemble(
            ports,
            config.server.port,
            config.server.max_upload_bytes,
        ))
    }

    pub fn assemble(ports: AppPorts, port: u16, max_upload_bytes: usize) -> Self {
        let AppPorts {
            document_repository,
            document_extractor,
            embedding_provider,
            vector_store,
            content_fetcher,
            chat_model,
        } = ports;

        // Create application services
        let vectorization_service = Arc::new(VectorizationService::new(
            embedding_provider.clone(),
            vector_store.clone(),
        ));
        let ingestion_service = Arc::new(IngestionService::new(
            document_extractor,
            document_repository.clone(),
            vectorization_service,
        ));
        let retrieval_service = Arc::new(RetrievalService::new(embedding_provider, vector_store));

        // Create use cases
        let upload_file_use_case = Arc::new(UploadFileUseCase::new(
            ingestion_service.clone(),
            max_upload_bytes,
        ));
        let process_url_use_case = Arc::new(ProcessUrlUseCase::new(
            content_fetcher,
            ingestion_service.clone(),
        ));
        let init_database_use_case =
            Arc::new(InitDatabaseUseCase::new(document_repository.clone()));
        let list_documents_use_case =
            Arc::new(ListDocumentsUseCase::new(document_repository.clone()));
        let create_document_use_case =
            Arc::new(CreateDocumentUseCase::new(document_repository.clone()));
        let delete_document_use_case =
            Arc::new(DeleteDocumentUseCase::new(document_repository.clone()));
        let add_resource_use_case = Arc::new(AddResourceUseCase::new(ingestion_service.clone()));
        let find_relevant_content_use_case =
            Arc::new(FindRelevantContentUseCase::new(retrieval_service.clone()));
        let chat_use_case = Arc::new(ChatUseCase::new(
            chat_model,
            add_resource_use_case.clone(),
            find_relevant_content_use_case.clone(),
        ));

        // Create HTTP handlers
        let document_handler = Arc::new(DocumentHandler::new(
            init_database_use_case.clone(),
            list_documents_use_case.clone(),
            create_document_use_case.clone(),
            delete_document_use_case.clone(),
        ));
        let ingestion_handler = Arc::new(IngestionHandler::new(
            upload_file_use_case.clone(),
            process_url_use_case.clone(),
        ));
        let chat_handler = Arc::new(ChatHandler::new(chat_use_case.clone()));

        Self {
            document_repository,
            ingestion_service,
            retrieval_service,
            upload_file_use_case,
            process_url_use_case,
            init_database_use_case,
            list_documents_use_case,
            create_document_use_case,
            delete_document_use_case,
            add_resource_use_case,
            find_relevant_content_use_case,
            chat_use_case,
            document_handler,
            ingestion_handler,
            chat_handler,
            port,
            max_upload_bytes,
        }
    }

    pub fn http_server(&self) -> HttpServer {
        HttpServer::new(
            self.document_handler.clone(),
            self.ingestion_handler.clone(),
            self.chat_handler.clone(),
            self.port,
            self.max_upload_bytes,
        )
    }
}
