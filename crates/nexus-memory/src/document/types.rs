use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Manual,
    Specification,
    Report,
    Policy,
}

impl DocumentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Specification => "specification",
            Self::Report => "report",
            Self::Policy => "policy",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "specification" => Ok(Self::Specification),
            "report" => Ok(Self::Report),
            "policy" => Ok(Self::Policy),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Processing,
    Processed,
    Error,
}

/// A catalog entry as exchanged with the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub chunks: usize,
    #[serde(default)]
    pub embeddings: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<String>,
    /// Raw text to ingest. Accepted on input only.
    #[serde(default, skip_serializing)]
    pub content: Option<String>,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            status: DocumentStatus::Processing,
            chunks: 0,
            embeddings: 0,
            size: None,
            uploaded_at: None,
            last_accessed: None,
            content: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Descriptive stand-in text used when no content was supplied.
    #[must_use]
    pub fn placeholder_content(&self) -> String {
        format!(
            "This is placeholder content for {name} ({kind}).\n\
             It contains information about building systems, maintenance procedures,\n\
             and technical specifications.",
            kind = self.kind,
            name = self.name,
        )
    }

    /// Supplied content, or the placeholder when none was given.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .clone()
            .unwrap_or_else(|| self.placeholder_content())
    }
}

/// Metadata stored alongside every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub document_id: String,
    pub document_name: String,
    pub document_type: DocumentKind,
    pub chunk_index: usize,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    #[must_use]
    pub fn new(document: &Document, index: usize, text: String) -> Self {
        Self {
            id: chunk_id(&document.id, index),
            text,
            metadata: ChunkMetadata {
                document_id: document.id.clone(),
                document_name: document.name.clone(),
                document_type: document.kind,
                chunk_index: index,
            },
        }
    }
}

#[must_use]
pub fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{document_id}-chunk-{index}")
}
