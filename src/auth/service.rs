// src/auth/service.rs

use anyhow::{Result, anyhow};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::jwt::create_token;
use super::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserWithPassword};
use super::password::{hash_password, verify_password};

pub struct AuthService {
    db: SqlitePool,
}

impl AuthService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(anyhow!("Invalid email address"));
        }
        if req.password.len() < 8 {
            return Err(anyhow!("Password must be at least 8 characters"));
        }
        if self.email_exists(&email).await? {
            return Err(anyhow!("Email already registered"));
        }

        let user_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&req.password)?;

        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user_id)
            .bind(&email)
            .bind(&password_hash)
            .execute(&self.db)
            .await?;

        // Every user carries a singleton profile row from day one
        sqlx::query("INSERT INTO profiles (user_id) VALUES (?)")
            .bind(&user_id)
            .execute(&self.db)
            .await?;

        let token = create_token(&user_id, &email)?;

        Ok(AuthResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        let user = self.get_user_by_email(&email).await?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(anyhow!("Invalid email or password"));
        }

        let token = create_token(&user.id, &user.email)?;

        Ok(AuthResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    pub async fn verify_user_id(&self, user_id: &str) -> Result<User> {
        let user = sqlx::query_as::<_, UserWithPassword>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map_err(|_| anyhow!("User not found"))?;

        Ok(user.into())
    }

    pub async fn mark_initial_call_completed(&self, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET initial_call_completed = TRUE WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserWithPassword> {
        sqlx::query_as::<_, UserWithPassword>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(|_| anyhow!("Invalid email or password"))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count.0 > 0)
    }
}
