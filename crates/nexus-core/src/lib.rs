//! Configuration, chat responder, document registry and service bootstrap.

pub mod bootstrap;
pub mod config;
pub mod registry;
pub mod responder;

pub use bootstrap::{AppBuilder, Services};
pub use config::Config;
pub use registry::DocumentRegistry;
pub use responder::{ChatMessage, ChatResponder, ResponderError};
