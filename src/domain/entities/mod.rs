pub mod document;
pub mod document_chunk;

pub use document::{Document, NewDocument};
pub use document_chunk::DocumentChunk;
