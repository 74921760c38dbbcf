use nexus_llm::provider::EmbedFn;

use crate::{DocumentCollection, QueryResult};

pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Embeds a query and fetches the closest chunks. Failures degrade to an empty result.
pub struct ContextRetriever {
    collection: DocumentCollection,
    embed_fn: EmbedFn,
}

impl ContextRetriever {
    pub fn new(collection: DocumentCollection, embed_fn: EmbedFn) -> Self {
        Self {
            collection,
            embed_fn,
        }
    }

    pub async fn retrieve(&self, query: &str, limit: usize) -> QueryResult {
        if limit == 0 {
            return QueryResult::default();
        }
        let embedding = match (self.embed_fn)(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("context retrieval skipped, embedding failed: {e}");
                return QueryResult::default();
            }
        };
        match self.collection.query(embedding, limit).await {
            Ok(result) => {
                tracing::debug!(matches = result.len(), limit, "retrieved context");
                result
            }
            Err(e) => {
                tracing::warn!(collection = self.collection.name(), "context query failed: {e}");
                QueryResult::default()
            }
        }
    }
}
