// src/materials/chapters.rs
// Chapter-level book features: a cached per-chapter summary, and the
// system prompt for discussing one chapter in chat.

use std::sync::Arc;

use super::store::Book;
use crate::llm::{GenerateRequest, TextGenerator};

const CHAPTER_SUMMARY_PROMPT: &str = r#"Summarize the book "{title}"{by_author} chapter by chapter. For each chapter give its title (or number) and 2-3 sentences of its core ideas, phrased for someone applying the book to their own growth. Use search to stay accurate to the real book. Output plain text with one section per chapter."#;

const DISCUSSION_PROMPT: &str = r#"You are a personal coach discussing the book "{title}"{by_author} with your client. Ground the discussion in the chapter summaries below; connect the ideas to the client's own goals and situation. Keep replies conversational.

Chapter summaries:
{summary}"#;

fn by_author(book: &Book) -> String {
    match &book.author {
        Some(author) if !author.trim().is_empty() => format!(" by {author}"),
        _ => String::new(),
    }
}

pub async fn generate_chapter_summary(
    llm: &Arc<dyn TextGenerator>,
    book: &Book,
) -> anyhow::Result<String> {
    let prompt = CHAPTER_SUMMARY_PROMPT
        .replace("{title}", &book.title)
        .replace("{by_author}", &by_author(book));

    let req = GenerateRequest::new(prompt)
        .with_search(true)
        .with_temperature(0.4)
        .with_max_output_tokens(2048);

    let summary = llm.generate(req).await?;
    Ok(summary.trim().to_string())
}

/// System prompt for a chapter discussion turn.
pub fn discussion_system_prompt(book: &Book, summary: &str) -> String {
    DISCUSSION_PROMPT
        .replace("{title}", &book.title)
        .replace("{by_author}", &by_author(book))
        .replace("{summary}", summary)
}
