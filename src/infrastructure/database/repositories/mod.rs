pub mod hosted_document_repository;
pub mod postgres_document_repository;

pub use hosted_document_repository::HostedDocumentRepository;
pub use postgres_document_repository::PostgresDocumentRepository;
