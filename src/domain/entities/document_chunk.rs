use serde::{Deserialize, Serialize};

/// Span of normalized document text headed for the vector store. Chunks only
/// exist for the duration of one vectorization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    text: String,
    chunk_index: usize,
    total_chunks: usize,
    file_name: String,
}

impl DocumentChunk {
    pub fn new(text: String, chunk_index: usize, total_chunks: usize, file_name: String) -> Self {
        Self {
            text,
            chunk_index,
            total_chunks,
            file_name,
        }
    }

    /// Tags an ordered list of chunk texts with their positions.
    pub fn sequence(texts: Vec<String>, file_name: &str) -> Vec<Self> {
        let total = texts.len();
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Self::new(text, index, total, file_name.to_string()))
            .collect()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn character_count(&self) -> usize {
        self.text.chars().count()
    }
}
