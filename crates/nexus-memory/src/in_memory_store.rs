use std::collections::HashMap;
use std::sync::RwLock;

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError, validate_point,
};

struct StoredPoint {
    id: String,
    vector: Vec<f32>,
    document: String,
    payload: HashMap<String, serde_json::Value>,
}

/// Points are kept in insertion order; `index` maps ids to their slot so a
/// replaced point keeps its original position.
struct InMemoryCollection {
    dimension: usize,
    index: HashMap<String, usize>,
    points: Vec<StoredPoint>,
}

impl InMemoryCollection {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            index: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn put(&mut self, point: VectorPoint) {
        let stored = StoredPoint {
            id: point.id,
            vector: point.vector,
            document: point.document,
            payload: point.payload,
        };
        if let Some(&slot) = self.index.get(&stored.id) {
            self.points[slot] = stored;
        } else {
            self.index.insert(stored.id.clone(), self.points.len());
            self.points.push(stored);
        }
    }
}

/// Brute-force cosine index held in process memory.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let dimension = usize::try_from(vector_size)
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            if dimension == 0 {
                return Err(VectorStoreError::Collection(
                    "vector size must be positive".into(),
                ));
            }
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            let col = cols
                .entry(collection.clone())
                .or_insert_with(|| InMemoryCollection::new(dimension));
            if col.dimension != dimension {
                return Err(VectorStoreError::Collection(format!(
                    "collection {collection} already exists with dimension {}",
                    col.dimension
                )));
            }
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let col = cols.get_mut(&collection).ok_or_else(|| {
                VectorStoreError::Upsert(format!("collection {collection} not found"))
            })?;
            for p in points {
                validate_point(&p, col.dimension)?;
                col.put(p);
            }
            Ok(())
        })
    }

    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let col = cols.get(&collection).ok_or_else(|| {
                VectorStoreError::Search(format!("collection {collection} not found"))
            })?;

            if col.points.is_empty() || limit == 0 {
                return Ok(Vec::new());
            }
            if vector.len() != col.dimension {
                return Err(VectorStoreError::Dimension {
                    expected: col.dimension,
                    actual: vector.len(),
                });
            }

            let mut scored: Vec<ScoredVectorPoint> = col
                .points
                .iter()
                .map(|sp| ScoredVectorPoint {
                    id: sp.id.clone(),
                    distance: cosine_distance(&vector, &sp.vector),
                    document: sp.document.clone(),
                    payload: sp.payload.clone(),
                })
                .collect();

            // Stable sort: equal distances keep insertion order.
            scored.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            scored.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(scored)
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            Ok(cols
                .get(&collection)
                .map_or(0, |col| col.points.len() as u64))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, vector: Vec<f32>, name: &str) -> VectorPoint {
        VectorPoint {
            id: id.into(),
            vector,
            document: format!("text of {id}"),
            payload: HashMap::from([("name".into(), serde_json::json!(name))]),
        }
    }

    #[tokio::test]
    async fn ensure_collection_accepts_upserts() {
        let store = InMemoryVectorStore::new();
        assert!(store.upsert("test", vec![point("a", vec![1.0, 0.0, 0.0], "A")]).await.is_err());
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert("test", vec![point("a", vec![1.0, 0.0, 0.0], "A")])
            .await
            .unwrap();
        assert_eq!(store.count("test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_collection_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert("test", vec![point("a", vec![1.0, 0.0, 0.0], "A")])
            .await
            .unwrap();
        store.ensure_collection("test", 3).await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_collection_rejects_dimension_change() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        assert!(store.ensure_collection("test", 4).await.is_err());
    }

    #[tokio::test]
    async fn ensure_collection_rejects_zero_dimension() {
        let store = InMemoryVectorStore::new();
        assert!(store.ensure_collection("test", 0).await.is_err());
    }

    #[tokio::test]
    async fn upsert_and_query_orders_by_distance() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    point("far", vec![0.0, 1.0, 0.0], "beta"),
                    point("near", vec![1.0, 0.0, 0.0], "alpha"),
                    point("mid", vec![1.0, 1.0, 0.0], "gamma"),
                ],
            )
            .await
            .unwrap();

        let results = store.query("test", vec![1.0, 0.0, 0.0], 3).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(results[0].distance.abs() < 1e-6);
        assert_eq!(results[0].document, "text of near");
        assert_eq!(results[0].payload["name"], "alpha");
    }

    #[tokio::test]
    async fn query_respects_limit() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        let points = (0..10)
            .map(|i| point(&format!("p{i}"), vec![1.0, i as f32], "x"))
            .collect();
        store.upsert("test", points).await.unwrap();

        let results = store.query("test", vec![1.0, 0.0], 4).await.unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    point("first", vec![1.0, 1.0], "a"),
                    point("second", vec![2.0, 2.0], "b"),
                    point("third", vec![3.0, 3.0], "c"),
                ],
            )
            .await
            .unwrap();

        let results = store.query("test", vec![1.0, 1.0], 3).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_in_place() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    point("a", vec![1.0, 0.0], "old"),
                    point("b", vec![1.0, 0.0], "other"),
                ],
            )
            .await
            .unwrap();
        store
            .upsert("test", vec![point("a", vec![1.0, 0.0], "new")])
            .await
            .unwrap();

        assert_eq!(store.count("test").await.unwrap(), 2);
        let results = store.query("test", vec![1.0, 0.0], 10).await.unwrap();
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].payload["name"], "new");
    }

    #[tokio::test]
    async fn empty_collection_query_returns_empty() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        let results = store.query("test", vec![1.0, 0.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn query_missing_collection_errors() {
        let store = InMemoryVectorStore::new();
        assert!(store.query("nope", vec![1.0], 5).await.is_err());
    }

    #[tokio::test]
    async fn query_with_wrong_dimension_errors() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert("test", vec![point("a", vec![1.0, 0.0], "x")])
            .await
            .unwrap();
        let err = store.query("test", vec![1.0, 0.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Dimension { .. }));
    }

    #[tokio::test]
    async fn failed_upsert_keeps_earlier_points() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        let result = store
            .upsert(
                "test",
                vec![
                    point("ok", vec![1.0, 0.0], "x"),
                    point("bad", vec![1.0, 0.0, 0.0], "y"),
                ],
            )
            .await;
        assert!(matches!(result, Err(VectorStoreError::Dimension { .. })));
        assert_eq!(store.count("test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_into_missing_collection_errors() {
        let store = InMemoryVectorStore::new();
        let result = store
            .upsert("nope", vec![point("a", vec![1.0], "x")])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn count_missing_collection_is_zero() {
        let store = InMemoryVectorStore::new();
        assert_eq!(store.count("nope").await.unwrap(), 0);
    }

    #[test]
    fn cosine_distance_orthogonal_is_one() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_distance_zero_vector_is_one() {
        let d = cosine_distance(&[0.0, 0.0], &[1.0, 0.0]);
        assert!((d - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryVectorStore::new();
        assert!(format!("{store:?}").contains("InMemoryVectorStore"));
    }
}
