// src/llm/mod.rs

mod client;
mod error;
mod streaming;
mod traits;
mod types;

pub use client::GeminiClient;
pub use error::ProviderError;
pub use streaming::{extract_chunk_text, extract_response_text};
pub use traits::TextGenerator;
pub use types::{Attachment, ChatMessage, GenerateRequest, MessageRole};
