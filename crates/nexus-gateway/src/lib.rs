//! HTTP API: chat, document processing, document listing and health.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;
