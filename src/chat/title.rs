// src/chat/title.rs
// Title lifecycle: one summarization call per chat after its first user
// message, with a truncation fallback so the placeholder never survives a
// real exchange.

use std::sync::Arc;
use tracing::warn;

use crate::llm::{GenerateRequest, TextGenerator};

const TITLE_PROMPT: &str = r#"Write a short title (2 to 6 words) for a coaching conversation that starts with the message below. Output only the title, no quotes, no punctuation at the end.

Message: {user_message}"#;

const MAX_TITLE_CHARS: usize = 50;
const MAX_TITLE_WORDS: usize = 6;
const FALLBACK_WORDS: usize = 5;
const FALLBACK_MAX_CHARS: usize = 30;

/// Naive truncation of the first few words of the message.
pub fn fallback_title(first_message: &str) -> String {
    let mut title = first_message
        .split_whitespace()
        .take(FALLBACK_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.len() > FALLBACK_MAX_CHARS {
        let cut = title
            .char_indices()
            .take_while(|(i, _)| *i < FALLBACK_MAX_CHARS - 3)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        title.truncate(cut);
        title.push_str("...");
    }

    title
}

fn strip_quotes(title: &str) -> &str {
    let title = title.trim();
    title
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| title.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(title)
}

fn acceptable(title: &str) -> bool {
    !title.is_empty()
        && title.len() <= MAX_TITLE_CHARS
        && title.split_whitespace().count() <= MAX_TITLE_WORDS
}

/// Generate a descriptive title for the first user message. Any failure
/// degrades to the truncation fallback; this never errors.
pub async fn generate_title(llm: &Arc<dyn TextGenerator>, first_message: &str) -> String {
    let prompt = TITLE_PROMPT.replace("{user_message}", first_message);
    let req = GenerateRequest::new(prompt)
        .with_temperature(0.7)
        .with_max_output_tokens(20);

    match llm.generate(req).await {
        Ok(raw) => {
            let title = strip_quotes(&raw).trim().to_string();
            if acceptable(&title) {
                title
            } else {
                fallback_title(first_message)
            }
        }
        Err(e) => {
            warn!(error = %e, "Title generation failed, using fallback");
            fallback_title(first_message)
        }
    }
}
