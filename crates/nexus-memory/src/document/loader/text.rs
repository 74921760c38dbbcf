use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader};
use crate::document::DocumentError;

/// Binary office formats that need a real parser.
const BINARY_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<String, DocumentError>> + Send + '_>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                return Err(DocumentError::UnsupportedFormat(ext));
            }

            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }

            let content = tokio::fs::read_to_string(&path).await?;
            tracing::debug!(path = %path.display(), bytes = content.len(), "loaded text file");
            Ok(content)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}
