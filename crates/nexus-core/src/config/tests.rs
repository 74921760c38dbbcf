use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 16] = [
    "NEXUS_LLM_BASE_URL",
    "NEXUS_LLM_MODEL",
    "NEXUS_LLM_EMBEDDING_MODEL",
    "NEXUS_LLM_TEMPERATURE",
    "NEXUS_LLM_MAX_TOKENS",
    "NEXUS_API_KEY",
    "OPENROUTER_API_KEY",
    "NEXUS_VECTOR_STORE",
    "NEXUS_QDRANT_URL",
    "NEXUS_COLLECTION",
    "NEXUS_RETRIEVAL_LIMIT",
    "NEXUS_GATEWAY_BIND",
    "NEXUS_GATEWAY_PORT",
    "PORT",
    "NEXUS_TIMEOUT_LLM",
    "NEXUS_TIMEOUT_EMBEDDING",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("nexus.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{body}").unwrap();
    path
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(config.llm.embedding_model, "text-embedding-ada-002");
    assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 500);
    assert_eq!(config.llm.embedding_dimension, 1536);
    assert_eq!(config.memory.vector_store, VectorBackend::Memory);
    assert_eq!(config.memory.collection, "building_documents");
    assert_eq!(config.memory.splitter, SplitterKind::Lines);
    assert_eq!(config.retrieval.limit, 5);
    assert_eq!(config.gateway.port, 5000);
    assert!(config.secrets.api_key.is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/nexus.toml")).unwrap();
    assert_eq!(config.llm.model, "deepseek/deepseek-r1-0528:free");
}

#[test]
#[serial]
fn parse_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[llm]
base_url = "http://localhost:8080/v1"
model = "gpt-4o-mini"
embedding_dimension = 384
referer = "https://example.com"

[memory]
vector_store = "qdrant"
collection = "tower_a"
splitter = "sentences"
chunk_size = 400
chunk_overlap = 50

[retrieval]
limit = 3

[gateway]
port = 9000
"#,
    );
    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.embedding_dimension, 384);
    assert_eq!(config.llm.referer.as_deref(), Some("https://example.com"));
    assert_eq!(config.llm.title.as_deref(), Some("Smart Insight Nexus"));
    assert_eq!(config.memory.vector_store, VectorBackend::Qdrant);
    assert_eq!(config.memory.collection, "tower_a");
    assert_eq!(config.memory.splitter, SplitterKind::Sentences);
    assert_eq!(config.memory.chunk_size, 400);
    assert_eq!(config.retrieval.limit, 3);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bind, "127.0.0.1");
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[llm\nmodel = ");
    clear_env();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn unknown_vector_store_in_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[memory]\nvector_store = \"chroma\"\n");
    clear_env();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("NEXUS_LLM_BASE_URL", "http://proxy:4000");
        std::env::set_var("NEXUS_LLM_MODEL", "override-model");
        std::env::set_var("NEXUS_LLM_EMBEDDING_MODEL", "override-embed");
        std::env::set_var("NEXUS_LLM_TEMPERATURE", "0.2");
        std::env::set_var("NEXUS_LLM_MAX_TOKENS", "256");
        std::env::set_var("NEXUS_VECTOR_STORE", "qdrant");
        std::env::set_var("NEXUS_QDRANT_URL", "http://qdrant:6334");
        std::env::set_var("NEXUS_COLLECTION", "override_docs");
        std::env::set_var("NEXUS_RETRIEVAL_LIMIT", "8");
        std::env::set_var("NEXUS_GATEWAY_BIND", "0.0.0.0");
        std::env::set_var("NEXUS_GATEWAY_PORT", "8088");
        std::env::set_var("NEXUS_TIMEOUT_LLM", "15");
        std::env::set_var("NEXUS_TIMEOUT_EMBEDDING", "5");
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.llm.base_url, "http://proxy:4000");
    assert_eq!(config.llm.model, "override-model");
    assert_eq!(config.llm.embedding_model, "override-embed");
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 256);
    assert_eq!(config.memory.vector_store, VectorBackend::Qdrant);
    assert_eq!(config.memory.qdrant_url, "http://qdrant:6334");
    assert_eq!(config.memory.collection, "override_docs");
    assert_eq!(config.retrieval.limit, 8);
    assert_eq!(config.gateway.bind, "0.0.0.0");
    assert_eq!(config.gateway.port, 8088);
    assert_eq!(config.timeouts.llm_seconds, 15);
    assert_eq!(config.timeouts.embedding_seconds, 5);
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("NEXUS_VECTOR_STORE", "chroma");
        std::env::set_var("NEXUS_GATEWAY_PORT", "not-a-port");
        std::env::set_var("NEXUS_RETRIEVAL_LIMIT", "-1");
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.memory.vector_store, VectorBackend::Memory);
    assert_eq!(config.gateway.port, 5000);
    assert_eq!(config.retrieval.limit, 5);
}

#[test]
#[serial]
fn api_key_from_env_prefers_nexus_key() {
    clear_env();
    unsafe {
        std::env::set_var("NEXUS_API_KEY", "nexus-key");
        std::env::set_var("OPENROUTER_API_KEY", "router-key");
    }
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(
        config.secrets.api_key.as_ref().map(Secret::expose),
        Some("nexus-key")
    );
}

#[test]
#[serial]
fn api_key_falls_back_to_openrouter_key() {
    clear_env();
    unsafe { std::env::set_var("OPENROUTER_API_KEY", "router-key") };
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(
        config.secrets.api_key.as_ref().map(Secret::expose),
        Some("router-key")
    );
}

#[test]
fn secret_is_redacted() {
    let secret = Secret::new("sk-or-v1-abc");
    assert_eq!(format!("{secret:?}"), "[REDACTED]");
    assert_eq!(secret.to_string(), "[REDACTED]");
    assert_eq!(secret.expose(), "sk-or-v1-abc");
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = Config::default();
    config.llm.embedding_dimension = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.llm.temperature = 3.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.memory.collection = "  ".into();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.memory.splitter = SplitterKind::Sentences;
    config.memory.chunk_overlap = config.memory.chunk_size;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.timeouts.llm_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.timeouts.embedding_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn zero_timeout_from_env_fails_load() {
    clear_env();
    unsafe { std::env::set_var("NEXUS_TIMEOUT_LLM", "0") };
    let result = Config::load(Path::new("/nonexistent/nexus.toml"));
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn port_env_is_a_fallback_for_gateway_port() {
    clear_env();
    unsafe { std::env::set_var("PORT", "8080") };
    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.gateway.port, 8080);

    unsafe { std::env::set_var("NEXUS_GATEWAY_PORT", "9090") };
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();
    assert_eq!(config.gateway.port, 9090);
}

#[test]
#[serial]
fn invalid_values_fail_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[llm]\nmax_tokens = 0\n");
    clear_env();
    assert!(Config::load(&path).is_err());
}
