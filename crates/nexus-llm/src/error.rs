#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited")]
    RateLimited,

    #[error("{operation} request timed out")]
    Timeout { operation: &'static str },

    #[error("input text is empty")]
    EmptyInput,

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("{provider} API request failed (status {status})")]
    Api { provider: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    pub(crate) fn from_send(err: reqwest::Error, operation: &'static str) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::Http(err)
        }
    }
}
