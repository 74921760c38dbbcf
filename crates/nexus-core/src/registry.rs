use std::collections::HashMap;

use tokio::sync::RwLock;

use nexus_memory::document::Document;

#[derive(Default)]
struct Entries {
    order: Vec<String>,
    by_id: HashMap<String, Document>,
}

/// Catalog of documents seen by the service, in first-seen order.
#[derive(Default)]
pub struct DocumentRegistry {
    inner: RwLock<Entries>,
}

impl DocumentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. Replacing keeps the original position.
    pub async fn upsert(&self, document: Document) {
        let mut entries = self.inner.write().await;
        if !entries.by_id.contains_key(&document.id) {
            entries.order.push(document.id.clone());
        }
        entries.by_id.insert(document.id.clone(), document);
    }

    pub async fn list(&self) -> Vec<Document> {
        let entries = self.inner.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| entries.by_id.get(id).cloned())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRegistry").finish_non_exhaustive()
    }
}
