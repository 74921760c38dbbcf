//! Vector storage, document ingestion and context retrieval.

pub mod collection;
pub mod document;
pub mod in_memory_store;
pub mod qdrant;
pub mod retriever;
pub mod vector_store;

pub use collection::{DEFAULT_COLLECTION, DocumentCollection, QueryMatch, QueryResult};
pub use in_memory_store::InMemoryVectorStore;
pub use qdrant::QdrantStore;
pub use retriever::{ContextRetriever, DEFAULT_RETRIEVAL_LIMIT};
pub use vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};
