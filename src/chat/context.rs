// src/chat/context.rs
// System-prompt assembly for the coaching chat: persona + the user's
// active goals + recent memories + the rolling summary when one exists.

use std::sync::Arc;
use tracing::warn;

use crate::config::CONFIG;
use crate::goals::GoalStore;
use crate::memory::MemoryStore;

const SYSTEM_PROMPT: &str = r#"You are a warm, practical personal coach. You help the user clarify goals, build plans, and follow through. Keep replies conversational and grounded in what you know about them. Ask one question at a time. When you reference facts about the user, use the coach notes below; never invent details."#;

pub async fn build_system_prompt(
    goals: &Arc<GoalStore>,
    memories: &Arc<MemoryStore>,
    user_id: &str,
    chat_summary: Option<&str>,
) -> String {
    let mut parts = vec![SYSTEM_PROMPT.to_string()];

    match goals.active(user_id, CONFIG.goals_context_limit).await {
        Ok(active) if !active.is_empty() => {
            let mut section = vec!["=== USER'S CURRENT GOALS ===".to_string()];
            for goal in active {
                section.push(format!("- {}", goal.description));
            }
            section.push("=== END GOALS ===".to_string());
            parts.push(section.join("\n"));
        }
        Ok(_) => {}
        Err(e) => warn!(user_id, error = %e, "Failed to load goals for context"),
    }

    match memories
        .recent_contents(user_id, CONFIG.memories_context_limit)
        .await
    {
        Ok(recent) if !recent.is_empty() => {
            let mut section = vec!["=== COACH NOTES & INSIGHTS ===".to_string()];
            for memory in recent {
                section.push(format!("- {memory}"));
            }
            section.push("=== END COACH NOTES ===".to_string());
            parts.push(section.join("\n"));
        }
        Ok(_) => {}
        Err(e) => warn!(user_id, error = %e, "Failed to load memories for context"),
    }

    if let Some(summary) = chat_summary {
        if !summary.trim().is_empty() {
            parts.push(format!("Previous conversation summary: {summary}"));
        }
    }

    parts.join("\n\n")
}
