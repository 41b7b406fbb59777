// src/chat/mod.rs

mod context;
mod store;
mod summary;
mod title;

pub use context::build_system_prompt;
pub use store::{Chat, ChatStore, Message, PLACEHOLDER_TITLE};
pub use summary::spawn_summarization;
pub use title::{fallback_title, generate_title};
