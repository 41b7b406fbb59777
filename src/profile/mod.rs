// src/profile/mod.rs
// Singleton per-user profile. Fields are only ever written through the
// special-key path of the extraction pipeline; each write touches exactly
// one column so sibling fields survive partial updates.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKey {
    FirstName,
    LastName,
    BirthDate,
}

impl ProfileKey {
    pub fn column(&self) -> &'static str {
        match self {
            ProfileKey::FirstName => "first_name",
            ProfileKey::LastName => "last_name",
            ProfileKey::BirthDate => "birth_date",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub struct ProfileStore {
    db: SqlitePool,
}

impl ProfileStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get(&self, user_id: &str) -> Result<Profile> {
        // The row is created at registration; tolerate its absence anyway.
        sqlx::query("INSERT OR IGNORE INTO profiles (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        let profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;

        Ok(profile)
    }

    /// Overwrite a single field; other fields are untouched.
    pub async fn set_field(&self, user_id: &str, key: ProfileKey, value: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO profiles (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        let sql = format!(
            "UPDATE profiles SET {} = ?, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?",
            key.column()
        );
        sqlx::query(&sql)
            .bind(value)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
