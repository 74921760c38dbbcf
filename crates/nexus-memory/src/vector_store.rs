use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
    #[error("invalid point: {0}")]
    InvalidPoint(String),
    #[error(
        "length mismatch: {ids} ids, {embeddings} embeddings, {metadatas} metadatas, {documents} documents"
    )]
    LengthMismatch {
        ids: usize,
        embeddings: usize,
        metadatas: usize,
        documents: usize,
    },
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    /// Source text the vector was computed from.
    pub document: String,
    pub payload: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ScoredVectorPoint {
    pub id: String,
    /// Cosine distance, `1 - cosine_similarity`. Lower is closer.
    pub distance: f32,
    pub document: String,
    pub payload: HashMap<String, serde_json::Value>,
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Collection-oriented vector index with a fixed cosine metric.
///
/// Implementations must be safe for concurrent upserts and queries.
pub trait VectorStore: Send + Sync {
    /// Create the collection with the given dimensionality if it does not exist.
    ///
    /// An existing collection with a different dimensionality or metric is an error.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Insert or replace points by id. Points written before a failing point stay written.
    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Return at most `limit` points ordered by ascending distance.
    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>>;

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>>;
}

/// Validate a point before it reaches a backend.
///
/// # Errors
///
/// Returns an error if the id is empty or the vector length differs from `dimension`.
pub(crate) fn validate_point(point: &VectorPoint, dimension: usize) -> Result<(), VectorStoreError> {
    if point.id.is_empty() {
        return Err(VectorStoreError::InvalidPoint("empty id".into()));
    }
    if point.vector.len() != dimension {
        return Err(VectorStoreError::Dimension {
            expected: dimension,
            actual: point.vector.len(),
        });
    }
    Ok(())
}
