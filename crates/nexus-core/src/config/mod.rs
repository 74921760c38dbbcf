mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.embedding_dimension == 0 {
            bail!("llm.embedding_dimension must be positive");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            );
        }
        if self.llm.max_tokens == 0 {
            bail!("llm.max_tokens must be positive");
        }
        if self.memory.collection.trim().is_empty() {
            bail!("memory.collection must not be empty");
        }
        if self.memory.splitter == SplitterKind::Sentences
            && self.memory.chunk_overlap >= self.memory.chunk_size
        {
            bail!("memory.chunk_overlap must be smaller than memory.chunk_size");
        }
        if self.timeouts.llm_seconds == 0 {
            bail!("timeouts.llm_seconds must be positive");
        }
        if self.timeouts.embedding_seconds == 0 {
            bail!("timeouts.embedding_seconds must be positive");
        }
        if self.gateway.max_body_size == 0 {
            bail!("gateway.max_body_size must be positive");
        }
        Ok(())
    }
}
