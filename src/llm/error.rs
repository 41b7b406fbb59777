// src/llm/error.rs

use thiserror::Error;

/// Failures from the model provider. `Unauthorized` is kept distinguishable
/// so the HTTP layer can map it to a 401 and force re-authentication.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("model provider rejected credentials")]
    Unauthorized,

    #[error("model provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("empty response from model provider")]
    EmptyResponse,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Unauthorized,
            _ => ProviderError::Api { status, body },
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ProviderError::Unauthorized)
    }
}
