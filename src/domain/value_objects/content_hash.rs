use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of a document's name and text. Vector record ids are derived from
/// it, so re-ingesting identical content overwrites instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of_document(file_name: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(file_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn record_id(&self, chunk_index: usize) -> String {
        format!("{}-{}", &self.0[..16], chunk_index)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let first = ContentHash::of_document("a.txt", "hello world");
        let second = ContentHash::of_document("a.txt", "hello world");
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn test_name_and_text_both_matter() {
        let base = ContentHash::of_document("a.txt", "hello");
        assert_ne!(base, ContentHash::of_document("b.txt", "hello"));
        assert_ne!(base, ContentHash::of_document("a.txt", "hello!"));
        // the separator keeps ("ab", "c") apart from ("a", "bc")
        assert_ne!(
            ContentHash::of_document("ab", "c"),
            ContentHash::of_document("a", "bc")
        );
    }

    #[test]
    fn test_record_ids() {
        let hash = ContentHash::of_document("a.txt", "hello");
        let id = hash.record_id(3);
        assert!(id.ends_with("-3"));
        assert_eq!(id.len(), 18);
        assert!(id.starts_with(&hash.as_str()[..16]));
    }
}
