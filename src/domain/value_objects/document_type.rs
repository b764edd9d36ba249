use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";
pub const HTML_MIME: &str = "text/html";
pub const JSON_MIME: &str = "application/json";

/// Source format of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    #[default]
    Text,
    Html,
    Json,
}

impl DocumentType {
    /// Maps a declared MIME type to a tag. Parameters such as `; charset=utf-8`
    /// are ignored and anything unrecognised falls back to `Text`.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            PDF_MIME => DocumentType::Pdf,
            DOCX_MIME => DocumentType::Docx,
            TEXT_MIME => DocumentType::Text,
            HTML_MIME => DocumentType::Html,
            JSON_MIME => DocumentType::Json,
            _ => DocumentType::Text,
        }
    }

    pub fn from_extension(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();

        match extension.as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "html" | "htm" => Some(DocumentType::Html),
            "json" => Some(DocumentType::Json),
            "txt" | "md" => Some(DocumentType::Text),
            _ => None,
        }
    }

    /// Resolves the type of an upload. Browsers send an empty or generic type
    /// for files they do not recognise, in which case the extension decides.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Self {
        match content_type.map(str::trim) {
            Some(ct) if !ct.is_empty() && !ct.starts_with("application/octet-stream") => {
                Self::from_content_type(ct)
            }
            _ => Self::from_extension(file_name).unwrap_or_default(),
        }
    }

    /// Parses a stored tag, defaulting to `Text` for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "pdf" => DocumentType::Pdf,
            "docx" => DocumentType::Docx,
            "html" => DocumentType::Html,
            "json" => DocumentType::Json,
            _ => DocumentType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Text => "text",
            DocumentType::Html => "html",
            DocumentType::Json => "json",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
