// src/chat/store.rs
// Chat session bookkeeping: chats, their messages, recency ordering.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::CONFIG;

pub const PLACEHOLDER_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Chat {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub struct ChatStore {
    db: SqlitePool,
}

impl ChatStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_chat(&self, user_id: &str, title: Option<&str>) -> Result<Chat> {
        let id = Uuid::new_v4().to_string();
        let title = match title {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => PLACEHOLDER_TITLE,
        };

        sqlx::query("INSERT INTO chats (id, user_id, title) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(title)
            .execute(&self.db)
            .await?;

        self.get_chat(user_id, &id)
            .await?
            .ok_or_else(|| anyhow!("Chat vanished after insert"))
    }

    pub async fn get_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(chat)
    }

    /// Most-recently-updated first. Untouched placeholder chats (default
    /// title, zero messages) are transient and never listed.
    pub async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT c.* FROM chats c
            WHERE c.user_id = ?
              AND NOT (
                c.title = ?
                AND NOT EXISTS (SELECT 1 FROM messages m WHERE m.chat_id = c.id)
              )
            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(PLACEHOLDER_TITLE)
        .fetch_all(&self.db)
        .await?;

        Ok(chats)
    }

    pub async fn rename_chat(&self, user_id: &str, chat_id: &str, title: &str) -> Result<Option<Chat>> {
        let result = sqlx::query("UPDATE chats SET title = ? WHERE id = ? AND user_id = ?")
            .bind(title)
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_chat(user_id, chat_id).await
    }

    /// Persist a message and bump the parent chat to the front of the
    /// recency list. Returns None when the save is a duplicate of the
    /// previous identical message inside the dedup window.
    pub async fn append_message(
        &self,
        user_id: &str,
        chat_id: &str,
        role: &str,
        content: &str,
    ) -> Result<Option<Message>> {
        let last_identical: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT created_at FROM messages
            WHERE chat_id = ? AND role = ? AND content = ?
            ORDER BY created_at DESC LIMIT 1
            "#,
        )
        .bind(chat_id)
        .bind(role)
        .bind(content)
        .fetch_optional(&self.db)
        .await?;

        if let Some((created_at,)) = last_identical {
            let window = Duration::seconds(CONFIG.duplicate_message_window_secs);
            if Utc::now() - created_at < window {
                return Ok(None);
            }
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO messages (id, chat_id, user_id, role, content) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(chat_id)
        .bind(user_id)
        .bind(role)
        .bind(content)
        .execute(&self.db)
        .await?;

        sqlx::query("UPDATE chats SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(chat_id)
            .execute(&self.db)
            .await?;

        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.db)
            .await?;

        Ok(Some(message))
    }

    pub async fn list_messages(&self, user_id: &str, chat_id: &str) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.* FROM messages m
            JOIN chats c ON c.id = m.chat_id
            WHERE m.chat_id = ? AND c.user_id = ?
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(messages)
    }

    pub async fn count_messages(&self, chat_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.db)
            .await?;

        Ok(count.0)
    }

    pub async fn set_summary(&self, chat_id: &str, summary: &str) -> Result<()> {
        sqlx::query("UPDATE chats SET summary = ? WHERE id = ?")
            .bind(summary)
            .bind(chat_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Cascade-delete a chat, then hand back the next current chat: the
    /// most recently updated survivor, or a fresh one when none remain.
    /// The caller is never left without a current chat.
    pub async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<Chat>> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let next = sqlx::query_as::<_, Chat>(
            "SELECT * FROM chats WHERE user_id = ? ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let next = match next {
            Some(chat) => chat,
            None => self.create_chat(user_id, None).await?,
        };

        Ok(Some(next))
    }
}
