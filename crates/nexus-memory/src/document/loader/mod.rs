mod text;

pub use text::TextLoader;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use super::DocumentError;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Reads raw text from a file on disk.
pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<String, DocumentError>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];
}
