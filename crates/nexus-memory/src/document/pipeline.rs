use futures::future::try_join_all;
use nexus_llm::provider::EmbedFn;

use super::{Chunk, Document, DocumentError, DocumentLoader, DocumentStatus, Splitter};
use crate::DocumentCollection;

/// Split, embed and store documents into a [`DocumentCollection`].
pub struct IngestionPipeline {
    splitter: Box<dyn Splitter>,
    collection: DocumentCollection,
    embed_fn: EmbedFn,
}

impl IngestionPipeline {
    pub fn new(
        splitter: Box<dyn Splitter>,
        collection: DocumentCollection,
        embed_fn: EmbedFn,
    ) -> Self {
        Self {
            splitter,
            collection,
            embed_fn,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &DocumentCollection {
        &self.collection
    }

    /// Split `text`, embed every chunk and upsert the result. Returns the chunk count.
    ///
    /// Re-ingesting the same document replaces its chunks, since chunk ids
    /// are derived from the document id and chunk index.
    ///
    /// # Errors
    ///
    /// Returns an error if any embedding or the store upsert fails.
    pub async fn ingest(&self, document: &Document, text: &str) -> Result<usize, DocumentError> {
        let chunks: Vec<Chunk> = self
            .splitter
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(document, i, t))
            .collect();
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = try_join_all(chunks.iter().map(|c| (self.embed_fn)(&c.text))).await?;

        let count = chunks.len();
        let mut ids = Vec::with_capacity(count);
        let mut metadatas = Vec::with_capacity(count);
        let mut documents = Vec::with_capacity(count);
        for chunk in chunks {
            ids.push(chunk.id);
            metadatas.push(chunk.metadata);
            documents.push(chunk.text);
        }
        self.collection
            .add(ids, embeddings, metadatas, documents)
            .await?;

        Ok(count)
    }

    /// Ingest a document and report the outcome on the document itself.
    ///
    /// Never fails: errors are logged and surface as [`DocumentStatus::Error`]
    /// with zeroed counts.
    pub async fn process(&self, mut document: Document) -> Document {
        let text = document.text();
        match self.ingest(&document, &text).await {
            Ok(n) => {
                tracing::info!(document.id = %document.id, chunks = n, "document processed");
                document.status = DocumentStatus::Processed;
                document.chunks = n;
                document.embeddings = n;
            }
            Err(e) => {
                tracing::error!(document.id = %document.id, "document processing failed: {e}");
                document.status = DocumentStatus::Error;
                document.chunks = 0;
                document.embeddings = 0;
            }
        }
        document.content = None;
        document
    }

    /// Read `path` with `loader` and process its text as `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded. Ingestion failures are
    /// reported through the returned document's status.
    pub async fn load_and_process(
        &self,
        loader: &(dyn DocumentLoader + '_),
        path: &std::path::Path,
        document: Document,
    ) -> Result<Document, DocumentError> {
        let text = loader.load(path).await?;
        Ok(self.process(document.with_content(text)).await)
    }
}
