// src/chat/summary.rs
// Rolling conversation summary: once a chat outgrows the truncation
// threshold, older turns are condensed and stored on the chat row so the
// gateway can keep prompts bounded. Best-effort; failures are logged.

use std::sync::Arc;
use tracing::{debug, warn};

use super::store::ChatStore;
use crate::config::CONFIG;
use crate::llm::{GenerateRequest, TextGenerator};

const SUMMARY_PROMPT: &str = r#"Condense the following coaching conversation into a short summary that preserves the facts, decisions, and open threads a coach would need to continue it. Output only the summary.

{history_text}"#;

pub fn spawn_summarization(
    llm: Arc<dyn TextGenerator>,
    chats: Arc<ChatStore>,
    user_id: String,
    chat_id: String,
) {
    tokio::spawn(async move {
        if let Err(e) = summarize_if_needed(&llm, &chats, &user_id, &chat_id).await {
            warn!(chat_id, error = %e, "Conversation summarization failed");
        }
    });
}

async fn summarize_if_needed(
    llm: &Arc<dyn TextGenerator>,
    chats: &Arc<ChatStore>,
    user_id: &str,
    chat_id: &str,
) -> anyhow::Result<()> {
    let count = chats.count_messages(chat_id).await?;
    if count <= CONFIG.history_truncate_threshold as i64 {
        return Ok(());
    }

    let messages = chats.list_messages(user_id, chat_id).await?;
    let keep = CONFIG.summary_keep_recent.min(messages.len());
    let older = &messages[..messages.len() - keep];
    if older.is_empty() {
        return Ok(());
    }

    let history_text = older
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = SUMMARY_PROMPT.replace("{history_text}", &history_text);
    let req = GenerateRequest::new(prompt)
        .with_temperature(0.3)
        .with_max_output_tokens(500);

    let summary = llm.generate(req).await?;
    chats.set_summary(chat_id, summary.trim()).await?;

    debug!(chat_id, older = older.len(), "Stored rolling summary");
    Ok(())
}
