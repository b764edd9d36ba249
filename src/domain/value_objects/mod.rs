pub mod content_hash;
pub mod document_type;
pub mod text_preview;

pub use content_hash::ContentHash;
pub use document_type::DocumentType;
pub use text_preview::TextPreview;
