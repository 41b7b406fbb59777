// src/goals/mod.rs
// Goal CRUD. Status changes only happen through explicit user action;
// there are no automatic transitions.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

pub const GOAL_STATUSES: [&str; 3] = ["active", "completed", "paused"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: String,
    pub target_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoal {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub target_date: Option<String>,
}

pub struct GoalStore {
    db: SqlitePool,
}

impl GoalStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>(
            "SELECT * FROM goals WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(goals)
    }

    pub async fn active(&self, user_id: &str, limit: i64) -> Result<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>(
            r#"
            SELECT * FROM goals WHERE user_id = ? AND status = 'active'
            ORDER BY created_at DESC LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(goals)
    }

    pub async fn create(&self, user_id: &str, goal: CreateGoal) -> Result<Goal> {
        if goal.title.trim().is_empty() || goal.description.trim().is_empty() {
            return Err(anyhow!("Goal title and description are required"));
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, title, description, category, priority, target_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(goal.title.trim())
        .bind(goal.description.trim())
        .bind(&goal.category)
        .bind(&goal.priority)
        .bind(&goal.target_date)
        .execute(&self.db)
        .await?;

        let created = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.db)
            .await?;

        Ok(created)
    }

    pub async fn set_status(
        &self,
        user_id: &str,
        goal_id: &str,
        status: &str,
    ) -> Result<Option<Goal>> {
        if !GOAL_STATUSES.contains(&status) {
            return Err(anyhow!("Invalid goal status: {status}"));
        }

        let result = sqlx::query("UPDATE goals SET status = ? WHERE id = ? AND user_id = ?")
            .bind(status)
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ?")
            .bind(goal_id)
            .fetch_one(&self.db)
            .await?;

        Ok(Some(goal))
    }

    pub async fn delete(&self, user_id: &str, goal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
