//! Qdrant-backed [`VectorStore`].

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CollectionInfo, CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder, value::Kind, vectors_config,
};

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError,
};

/// Payload key holding the caller-supplied point id.
const ID_FIELD: &str = "chunk_id";
/// Payload key holding the source text.
const DOCUMENT_FIELD: &str = "document";

/// Deterministic namespace for chunk id → point UUID mapping.
const POINT_NAMESPACE: uuid::Uuid = uuid::Uuid::NAMESPACE_OID;

#[derive(Clone)]
pub struct QdrantStore {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore").finish_non_exhaustive()
    }
}

impl QdrantStore {
    /// Connect to Qdrant at the given gRPC URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn new(url: &str) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Qdrant point ids must be integers or UUIDs; chunk ids are free-form strings.
pub(crate) fn point_uuid(id: &str) -> String {
    uuid::Uuid::new_v5(&POINT_NAMESPACE, id.as_bytes()).to_string()
}

fn to_point_struct(point: VectorPoint) -> Result<PointStruct, VectorStoreError> {
    if point.id.is_empty() {
        return Err(VectorStoreError::InvalidPoint("empty id".into()));
    }
    let mut fields = serde_json::Map::with_capacity(point.payload.len() + 2);
    fields.extend(point.payload);
    fields.insert(ID_FIELD.into(), serde_json::Value::String(point.id.clone()));
    fields.insert(
        DOCUMENT_FIELD.into(),
        serde_json::Value::String(point.document),
    );
    let payload: HashMap<String, qdrant_client::qdrant::Value> =
        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| VectorStoreError::InvalidPoint(e.to_string()))?;
    Ok(PointStruct::new(point_uuid(&point.id), point.vector, payload))
}

/// Reject an existing collection whose vectors are not `vector_size` cosine vectors.
fn check_vector_params(
    collection: &str,
    info: &CollectionInfo,
    vector_size: u64,
) -> Result<(), VectorStoreError> {
    let params = info
        .config
        .as_ref()
        .and_then(|c| c.params.as_ref())
        .and_then(|p| p.vectors_config.as_ref())
        .and_then(|v| v.config.as_ref());
    let Some(vectors_config::Config::Params(params)) = params else {
        return Err(VectorStoreError::Collection(format!(
            "{collection}: expected a single unnamed vector config"
        )));
    };
    if params.size != vector_size {
        return Err(VectorStoreError::Collection(format!(
            "{collection}: existing vector size {} differs from {vector_size}",
            params.size
        )));
    }
    if params.distance != Distance::Cosine as i32 {
        return Err(VectorStoreError::Collection(format!(
            "{collection}: existing distance {:?} is not cosine",
            Distance::try_from(params.distance).unwrap_or(Distance::UnknownDistance)
        )));
    }
    Ok(())
}

fn kind_to_json(kind: &Kind) -> serde_json::Value {
    match kind {
        Kind::NullValue(_) => serde_json::Value::Null,
        Kind::BoolValue(b) => serde_json::Value::Bool(*b),
        Kind::IntegerValue(i) => serde_json::json!(i),
        Kind::DoubleValue(d) => serde_json::json!(d),
        Kind::StringValue(s) => serde_json::Value::String(s.clone()),
        Kind::ListValue(list) => serde_json::Value::Array(
            list.values
                .iter()
                .filter_map(|v| v.kind.as_ref().map(kind_to_json))
                .collect(),
        ),
        Kind::StructValue(s) => serde_json::Value::Object(
            s.fields
                .iter()
                .filter_map(|(k, v)| v.kind.as_ref().map(|kind| (k.clone(), kind_to_json(kind))))
                .collect(),
        ),
    }
}

fn from_scored(point: qdrant_client::qdrant::ScoredPoint) -> ScoredVectorPoint {
    let mut payload: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| v.kind.as_ref().map(|kind| (k, kind_to_json(kind))))
        .collect();
    let id = match payload.remove(ID_FIELD) {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    };
    let document = match payload.remove(DOCUMENT_FIELD) {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    };
    ScoredVectorPoint {
        id,
        // Qdrant reports cosine similarity as the score.
        distance: 1.0 - point.score,
        document,
        payload,
    }
}

impl VectorStore for QdrantStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
            if exists {
                let info = self
                    .client
                    .collection_info(collection.as_str())
                    .await
                    .map_err(|e| VectorStoreError::Connection(e.to_string()))?
                    .result
                    .ok_or_else(|| {
                        VectorStoreError::Collection(format!("{collection}: no collection info"))
                    })?;
                return check_vector_params(&collection, &info, vector_size);
            }
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(collection.as_str())
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            tracing::info!(collection = %collection, vector_size, "created qdrant collection");
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
            if points.is_empty() {
                return Ok(());
            }
            let points = points
                .into_iter()
                .map(to_point_struct)
                .collect::<Result<Vec<_>, _>>()?;
            self.client
                .upsert_points(UpsertPointsBuilder::new(collection.as_str(), points).wait(true))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
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
            if limit == 0 {
                return Ok(Vec::new());
            }
            let results = self
                .client
                .search_points(
                    SearchPointsBuilder::new(collection.as_str(), vector, limit)
                        .with_payload(true),
                )
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            Ok(results.result.into_iter().map(from_scored).collect())
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let response = self
                .client
                .count(CountPointsBuilder::new(collection.as_str()).exact(true))
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            Ok(response.result.map_or(0, |r| r.count))
        })
    }
}
