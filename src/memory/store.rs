// src/memory/store.rs

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::dedup::is_near_duplicate;
use super::types::Memory;

pub struct MemoryStore {
    db: SqlitePool,
}

impl MemoryStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Memory>> {
        let memories = sqlx::query_as::<_, Memory>(
            "SELECT * FROM memories WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(memories)
    }

    pub async fn recent_contents(&self, user_id: &str, limit: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT content FROM memories WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    /// Insert unless the content restates an existing memory for this user.
    /// Returns the new row, or None when deduplicated away.
    pub async fn save_if_new(
        &self,
        user_id: &str,
        content: &str,
        dedup_threshold: f32,
    ) -> Result<Option<Memory>> {
        let existing: Vec<(String,)> =
            sqlx::query_as("SELECT content FROM memories WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.db)
                .await?;

        if is_near_duplicate(
            content,
            existing.iter().map(|(c,)| c.as_str()),
            dedup_threshold,
        ) {
            debug!(user_id, content, "Skipping near-duplicate memory");
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO memories (id, user_id, content) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(content)
            .execute(&self.db)
            .await?;

        let memory = sqlx::query_as::<_, Memory>("SELECT * FROM memories WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.db)
            .await?;

        Ok(Some(memory))
    }

    /// Delete one memory; true if a row was removed.
    pub async fn delete(&self, user_id: &str, memory_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ? AND user_id = ?")
            .bind(memory_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
