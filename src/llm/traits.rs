// src/llm/traits.rs
// Provider seam: everything above the client (chat gateway, extraction,
// titles, recommendations) talks to this trait, never to GeminiClient.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ProviderError;
use super::types::GenerateRequest;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single completed text.
    async fn generate(&self, req: GenerateRequest) -> Result<String, ProviderError>;

    /// Stream text deltas into `tx` in generation order; returns the full
    /// assembled text once the provider signals completion. A closed
    /// receiver means the client went away: the generation is abandoned
    /// and an error returned so callers persist nothing.
    async fn stream_to_channel(
        &self,
        req: GenerateRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ProviderError>;
}
