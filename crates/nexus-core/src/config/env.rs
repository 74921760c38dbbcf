use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_memory();
        self.apply_env_overrides_gateway();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("NEXUS_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("NEXUS_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("NEXUS_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("NEXUS_LLM_TEMPERATURE")
            && let Ok(t) = v.parse::<f32>()
        {
            self.llm.temperature = t;
        }
        if let Ok(v) = std::env::var("NEXUS_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Some(key) = std::env::var("NEXUS_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
        {
            self.secrets.api_key = Some(Secret::new(key));
        }
        if let Ok(v) = std::env::var("NEXUS_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
        if let Ok(v) = std::env::var("NEXUS_TIMEOUT_EMBEDDING")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.embedding_seconds = secs;
        }
    }

    fn apply_env_overrides_memory(&mut self) {
        if let Ok(v) = std::env::var("NEXUS_VECTOR_STORE") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.memory.vector_store = kind;
            } else {
                tracing::warn!("ignoring invalid NEXUS_VECTOR_STORE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("NEXUS_QDRANT_URL") {
            self.memory.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("NEXUS_COLLECTION") {
            self.memory.collection = v;
        }
        if let Ok(v) = std::env::var("NEXUS_RETRIEVAL_LIMIT")
            && let Ok(limit) = v.parse::<usize>()
        {
            self.retrieval.limit = limit;
        }
    }

    fn apply_env_overrides_gateway(&mut self) {
        if let Ok(v) = std::env::var("NEXUS_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("NEXUS_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
    }
}
