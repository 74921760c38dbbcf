//! Embedding and chat-completion clients for OpenAI-compatible providers.

pub mod any;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;

pub use error::LlmError;
pub use provider::{GenerationOptions, LlmProvider};
