//! Application bootstrap: config resolution, provider and store construction.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;

use nexus_llm::{GenerationOptions, LlmProvider};
use nexus_llm::any::AnyProvider;
use nexus_llm::openai::OpenAiProvider;
use nexus_memory::document::{
    IngestionPipeline, LineSplitter, Splitter, SplitterConfig, TextSplitter,
};
use nexus_memory::{
    ContextRetriever, DocumentCollection, InMemoryVectorStore, QdrantStore, VectorStore,
};

use crate::config::{Config, SplitterKind, VectorBackend};
use crate::registry::DocumentRegistry;
use crate::responder::ChatResponder;

/// Shared, fully wired services.
pub struct Services {
    pub collection: DocumentCollection,
    pub pipeline: Arc<IngestionPipeline>,
    pub responder: Arc<ChatResponder<AnyProvider>>,
    pub registry: Arc<DocumentRegistry>,
}

pub struct AppBuilder {
    config: Config,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load the config at `path` (or defaults) with env overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let config = Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn build_provider(&self) -> AnyProvider {
        create_provider(&self.config)
    }

    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        Ok(match self.config.memory.vector_store {
            VectorBackend::Memory => Arc::new(InMemoryVectorStore::new()),
            VectorBackend::Qdrant => Arc::new(
                QdrantStore::new(&self.config.memory.qdrant_url)
                    .context("failed to create qdrant client")?,
            ),
        })
    }

    #[must_use]
    pub fn build_splitter(&self) -> Box<dyn Splitter> {
        match self.config.memory.splitter {
            SplitterKind::Lines => Box::new(LineSplitter),
            SplitterKind::Sentences => Box::new(TextSplitter::new(SplitterConfig {
                chunk_size: self.config.memory.chunk_size,
                chunk_overlap: self.config.memory.chunk_overlap,
                sentence_aware: true,
            })),
        }
    }

    /// Wire store, collection, pipeline, retriever and responder around `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created or the collection cannot
    /// be ensured with the configured embedding dimension.
    pub async fn build_services(&self, provider: AnyProvider) -> anyhow::Result<Services> {
        let store = self.build_store()?;
        self.build_services_with_store(provider, store).await
    }

    /// Same as [`Self::build_services`] with a caller-supplied store.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be ensured.
    pub async fn build_services_with_store(
        &self,
        provider: AnyProvider,
        store: Arc<dyn VectorStore>,
    ) -> anyhow::Result<Services> {
        let collection = DocumentCollection::new(store, self.config.memory.collection.clone());
        collection
            .ensure(self.config.llm.embedding_dimension)
            .await
            .with_context(|| format!("failed to ensure collection {}", collection.name()))?;
        tracing::info!(
            collection = collection.name(),
            backend = ?self.config.memory.vector_store,
            dimension = self.config.llm.embedding_dimension,
            "vector collection ready"
        );

        if !provider.supports_embeddings() {
            tracing::warn!(
                provider = provider.name(),
                "provider has no embedding model: ingestion will fail and chat runs without context"
            );
        }
        let embed_fn = provider.embed_fn();
        let pipeline = Arc::new(IngestionPipeline::new(
            self.build_splitter(),
            collection.clone(),
            embed_fn.clone(),
        ));
        let retriever = Arc::new(ContextRetriever::new(collection.clone(), embed_fn));
        let responder = Arc::new(
            ChatResponder::new(provider, retriever)
                .with_retrieval_limit(self.config.retrieval.limit),
        );

        Ok(Services {
            collection,
            pipeline,
            responder,
            registry: Arc::new(DocumentRegistry::new()),
        })
    }

    #[must_use]
    pub fn build_shutdown() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }
}

/// Build the OpenAI-compatible provider described by `config`.
#[must_use]
pub fn create_provider(config: &Config) -> AnyProvider {
    let api_key = config
        .secrets
        .api_key
        .as_ref()
        .map(|s| s.expose().to_owned())
        .unwrap_or_else(|| {
            tracing::warn!("no API key configured (NEXUS_API_KEY / OPENROUTER_API_KEY)");
            String::new()
        });

    let embedding_model =
        Some(config.llm.embedding_model.clone()).filter(|m| !m.trim().is_empty());

    let provider = OpenAiProvider::new(
        api_key,
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        embedding_model,
    )
    .with_options(GenerationOptions {
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    })
    .with_timeouts(
        Duration::from_secs(config.timeouts.llm_seconds),
        Duration::from_secs(config.timeouts.embedding_seconds),
    )
    .with_attribution(config.llm.referer.clone(), config.llm.title.clone());

    AnyProvider::OpenAi(provider)
}
