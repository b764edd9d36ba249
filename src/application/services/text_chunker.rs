use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static CRLF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{3,}").expect("valid regex"));

/// Chunks whose trimmed length is at or below this are dropped as noise.
pub const MIN_CHUNK_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPolicy {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingPolicy {
    /// Larger inputs get larger chunks so the chunk count stays bounded.
    pub fn for_length(char_count: usize) -> Self {
        if char_count > 100_000 {
            Self {
                chunk_size: 1000,
                chunk_overlap: 100,
            }
        } else if char_count > 10_000 {
            Self {
                chunk_size: 750,
                chunk_overlap: 75,
            }
        } else {
            Self {
                chunk_size: 500,
                chunk_overlap: 50,
            }
        }
    }
}

/// Character splitter that tries paragraph, line, then word boundaries
/// before falling back to single characters. Separators stay attached to
/// the start of the piece that follows them.
#[derive(Debug, Clone)]
pub struct RTSplitter {
    separators: Vec<&'static str>,
}

impl Default for RTSplitter {
    fn default() -> Self {
        Self {
            separators: vec![
                "\n\n", // Double newline (paragraphs)
                "\n",   // Single newline
                " ",    // Space
                "",     // Character level
            ],
        }
    }
}

impl RTSplitter {
    pub fn split_text(&self, text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
        self.recursive_split(text, &self.separators, chunk_size, chunk_overlap)
    }

    fn recursive_split(
        &self,
        text: &str,
        separators: &[&'static str],
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&'static str] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                remaining = &[];
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(merge_pieces(&fitting, chunk_size, chunk_overlap));
                fitting.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.recursive_split(piece, remaining, chunk_size, chunk_overlap));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(merge_pieces(&fitting, chunk_size, chunk_overlap));
        }

        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
            start = index;
        }
    }
    pieces.push(&text[start..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// Greedily packs pieces into chunks of at most `chunk_size` characters,
/// carrying up to `chunk_overlap` trailing characters into the next chunk.
fn merge_pieces(pieces: &[&str], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0;

    for &piece in pieces {
        let len = char_len(piece);

        if total + len > chunk_size && !window.is_empty() {
            push_joined(&mut chunks, &window);

            while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                match window.pop_front() {
                    Some(front) => total -= char_len(front),
                    None => break,
                }
            }
        }

        window.push_back(piece);
        total += len;
    }

    push_joined(&mut chunks, &window);
    chunks
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Splits document text into ordered, overlapping chunks for embedding.
#[derive(Debug, Clone)]
pub struct TextChunker {
    splitter: RTSplitter,
    min_chunk_chars: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            splitter: RTSplitter::default(),
            min_chunk_chars: MIN_CHUNK_CHARS,
        }
    }
}

impl TextChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unifies line endings, caps blank lines at one and collapses long
    /// whitespace runs.
    pub fn normalize(text: &str) -> String {
        let text = CRLF.replace_all(text, "\n");
        let text = BLANK_LINES.replace_all(&text, "\n\n");
        let text = WHITESPACE_RUNS.replace_all(&text, " ");
        text.trim().to_string()
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let normalized = Self::normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let policy = ChunkingPolicy::for_length(char_len(&normalized));

        self.splitter
            .split_text(&normalized, policy.chunk_size, policy.chunk_overlap)
            .into_iter()
            .filter(|chunk| char_len(chunk.trim()) > self.min_chunk_chars)
            .collect()
    }
}
