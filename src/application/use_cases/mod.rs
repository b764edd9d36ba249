pub mod add_resource;
pub mod chat;
pub mod create_document;
pub mod delete_document;
pub mod find_relevant_content;
pub mod init_database;
pub mod list_documents;
pub mod process_url;
pub mod upload_file;

pub use add_resource::AddResourceUseCase;
pub use chat::ChatUseCase;
pub use create_document::CreateDocumentUseCase;
pub use delete_document::DeleteDocumentUseCase;
pub use find_relevant_content::FindRelevantContentUseCase;
pub use init_database::InitDatabaseUseCase;
pub use list_documents::ListDocumentsUseCase;
pub use process_url::ProcessUrlUseCase;
pub use upload_file::UploadFileUseCase;
