pub mod error;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, TextLoader};
pub use pipeline::IngestionPipeline;
pub use splitter::{LineSplitter, Splitter, SplitterConfig, TextSplitter};
pub use types::{Chunk, ChunkMetadata, Document, DocumentKind, DocumentStatus, chunk_id};
