use std::collections::HashMap;
use std::sync::Arc;

use crate::document::ChunkMetadata;
use crate::vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};

pub const DEFAULT_COLLECTION: &str = "building_documents";

/// One retrieved chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Matches ordered by ascending distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub matches: Vec<QueryMatch>,
}

impl QueryResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.text.as_str()).collect()
    }

    /// Distinct document names in first-appearance order.
    #[must_use]
    pub fn document_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for m in &self.matches {
            if !names.contains(&m.metadata.document_name) {
                names.push(m.metadata.document_name.clone());
            }
        }
        names
    }

    /// `1 - min distance` clamped to `[0, 1]`, or `None` when empty.
    #[must_use]
    pub fn best_similarity(&self) -> Option<f32> {
        self.matches
            .iter()
            .map(|m| m.distance)
            .min_by(f32::total_cmp)
            .map(|d| (1.0 - d).clamp(0.0, 1.0))
    }
}

/// A named collection of document chunks on top of a [`VectorStore`].
#[derive(Clone)]
pub struct DocumentCollection {
    store: Arc<dyn VectorStore>,
    name: String,
}

impl std::fmt::Debug for DocumentCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DocumentCollection {
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the underlying collection if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the dimension or is unreachable.
    pub async fn ensure(&self, dimension: u64) -> Result<(), VectorStoreError> {
        self.store.ensure_collection(&self.name, dimension).await
    }

    /// Upsert parallel arrays of ids, embeddings, metadata and source texts.
    ///
    /// # Errors
    ///
    /// Returns [`VectorStoreError::LengthMismatch`] if the arrays differ in length,
    /// or any error raised by the store.
    pub async fn add(
        &self,
        ids: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<ChunkMetadata>,
        documents: Vec<String>,
    ) -> Result<(), VectorStoreError> {
        let n = ids.len();
        if embeddings.len() != n || metadatas.len() != n || documents.len() != n {
            return Err(VectorStoreError::LengthMismatch {
                ids: n,
                embeddings: embeddings.len(),
                metadatas: metadatas.len(),
                documents: documents.len(),
            });
        }

        let mut points = Vec::with_capacity(n);
        for (((id, vector), metadata), document) in
            ids.into_iter().zip(embeddings).zip(metadatas).zip(documents)
        {
            let payload = match serde_json::to_value(&metadata) {
                Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
                Ok(_) => HashMap::new(),
                Err(e) => return Err(VectorStoreError::InvalidPoint(e.to_string())),
            };
            points.push(VectorPoint {
                id,
                vector,
                document,
                payload,
            });
        }
        self.store.upsert(&self.name, points).await
    }

    /// Nearest `top_k` chunks to `embedding`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn query(
        &self,
        embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<QueryResult, VectorStoreError> {
        if top_k == 0 {
            return Ok(QueryResult::default());
        }
        let scored = self
            .store
            .query(&self.name, embedding, top_k as u64)
            .await?;
        let matches = scored.into_iter().filter_map(to_match).collect();
        Ok(QueryResult { matches })
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    pub async fn count(&self) -> Result<u64, VectorStoreError> {
        self.store.count(&self.name).await
    }
}

fn to_match(point: ScoredVectorPoint) -> Option<QueryMatch> {
    let payload: serde_json::Map<String, serde_json::Value> = point.payload.into_iter().collect();
    match serde_json::from_value::<ChunkMetadata>(serde_json::Value::Object(payload)) {
        Ok(metadata) => Some(QueryMatch {
            id: point.id,
            text: point.document,
            metadata,
            distance: point.distance,
        }),
        Err(e) => {
            tracing::warn!(chunk.id = %point.id, "skipping chunk with malformed metadata: {e}");
            None
        }
    }
}
