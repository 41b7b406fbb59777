// src/materials/store.rs

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub channel: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MaterialFeedback {
    pub id: String,
    pub user_id: String,
    pub material_type: String,
    pub material_id: String,
    pub rating: i64,
    pub review: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub url: String,
    pub channel: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

pub struct MaterialStore {
    db: SqlitePool,
}

impl MaterialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn insert_book(&self, user_id: &str, book: NewBook) -> Result<Book> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO books (id, user_id, title, author, description) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .execute(&self.db)
        .await?;

        self.get_book(user_id, &id)
            .await?
            .ok_or_else(|| anyhow!("Book vanished after insert"))
    }

    pub async fn insert_video(&self, user_id: &str, video: NewVideo) -> Result<Video> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO videos (id, user_id, title, url, channel, description, thumbnail)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.channel)
        .bind(&video.description)
        .bind(&video.thumbnail)
        .execute(&self.db)
        .await?;

        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.db)
            .await?;

        Ok(video)
    }

    pub async fn list_books(&self, user_id: &str) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(books)
    }

    pub async fn list_videos(&self, user_id: &str) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(videos)
    }

    pub async fn get_book(&self, user_id: &str, book_id: &str) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ? AND user_id = ?")
            .bind(book_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(book)
    }

    pub async fn set_book_summary(&self, user_id: &str, book_id: &str, summary: &str) -> Result<()> {
        sqlx::query("UPDATE books SET summary = ? WHERE id = ? AND user_id = ?")
            .bind(summary)
            .bind(book_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    pub async fn has_recommendations(&self, user_id: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok(count.0 > 0)
    }

    /// One feedback record per (user, type, material); resubmission
    /// updates in place rather than duplicating.
    pub async fn upsert_feedback(
        &self,
        user_id: &str,
        material_type: &str,
        material_id: &str,
        rating: i64,
        review: Option<&str>,
        completed: bool,
    ) -> Result<MaterialFeedback> {
        if !matches!(material_type, "book" | "video") {
            return Err(anyhow!("Invalid material type: {material_type}"));
        }
        if !(1..=5).contains(&rating) {
            return Err(anyhow!("Rating must be between 1 and 5"));
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO material_feedback (id, user_id, material_type, material_id, rating, review, completed)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, material_type, material_id) DO UPDATE SET
                rating = excluded.rating,
                review = excluded.review,
                completed = excluded.completed,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(material_type)
        .bind(material_id)
        .bind(rating)
        .bind(review)
        .bind(completed)
        .execute(&self.db)
        .await?;

        let feedback = sqlx::query_as::<_, MaterialFeedback>(
            r#"
            SELECT * FROM material_feedback
            WHERE user_id = ? AND material_type = ? AND material_id = ?
            "#,
        )
        .bind(user_id)
        .bind(material_type)
        .bind(material_id)
        .fetch_one(&self.db)
        .await?;

        Ok(feedback)
    }

    pub async fn list_feedback(&self, user_id: &str) -> Result<Vec<MaterialFeedback>> {
        let feedback = sqlx::query_as::<_, MaterialFeedback>(
            "SELECT * FROM material_feedback WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(feedback)
    }
}
