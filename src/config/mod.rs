// src/config/mod.rs
// All tunables load from the environment (.env supported); defaults below.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct CoachConfig {
    // ── Gemini Configuration
    pub gemini_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: usize,
    pub enable_search_grounding: bool,

    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Chat & History Configuration
    pub history_truncate_threshold: usize,
    pub summary_keep_recent: usize,
    pub goals_context_limit: i64,
    pub memories_context_limit: i64,
    pub duplicate_message_window_secs: i64,

    // ── Memory Extraction Configuration
    pub memory_dedup_threshold: f32,
    pub extraction_memory_context: i64,

    // ── Interview Configuration
    pub interview_completion_mode: String,
    pub interview_sentinel: String,
    pub interview_closing: String,

    // ── Recommendation Configuration
    pub recommend_candidates_per_kind: usize,
    pub recommend_books: usize,
    pub recommend_videos: usize,

    // ── Server Configuration
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    // ── Logging Configuration
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl CoachConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            gemini_base_url: env_var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ),
            model: env_var_or("COACH_MODEL", "gemini-2.0-flash".to_string()),
            temperature: env_var_or("COACH_TEMPERATURE", 0.7),
            max_output_tokens: env_var_or("COACH_MAX_OUTPUT_TOKENS", 2048),
            enable_search_grounding: env_var_or("COACH_ENABLE_SEARCH_GROUNDING", true),
            database_url: env_var_or("DATABASE_URL", "sqlite:./coach.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            history_truncate_threshold: env_var_or("COACH_HISTORY_TRUNCATE_THRESHOLD", 30),
            summary_keep_recent: env_var_or("COACH_SUMMARY_KEEP_RECENT", 20),
            goals_context_limit: env_var_or("COACH_GOALS_CONTEXT_LIMIT", 10),
            memories_context_limit: env_var_or("COACH_MEMORIES_CONTEXT_LIMIT", 15),
            duplicate_message_window_secs: env_var_or("COACH_DUPLICATE_MESSAGE_WINDOW", 60),
            memory_dedup_threshold: env_var_or("MEMORY_DEDUP_THRESHOLD", 0.80),
            extraction_memory_context: env_var_or("MEMORY_EXTRACTION_CONTEXT", 15),
            interview_completion_mode: env_var_or(
                "INTERVIEW_COMPLETION_MODE",
                "sentinel".to_string(),
            ),
            interview_sentinel: env_var_or(
                "INTERVIEW_SENTINEL",
                "[INTERVIEW_COMPLETE]".to_string(),
            ),
            interview_closing: env_var_or(
                "INTERVIEW_CLOSING",
                "I have everything I need to put your plan together".to_string(),
            ),
            recommend_candidates_per_kind: env_var_or("RECOMMEND_CANDIDATES_PER_KIND", 6),
            recommend_books: env_var_or("RECOMMEND_BOOKS", 4),
            recommend_videos: env_var_or("RECOMMEND_VIDEOS", 4),
            host: env_var_or("COACH_HOST", "0.0.0.0".to_string()),
            port: env_var_or("COACH_PORT", 8000),
            cors_origin: env_var_or("COACH_CORS_ORIGIN", "http://localhost:5173".to_string()),
            log_level: env_var_or("COACH_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full Gemini endpoint URL for a model action, e.g. `generateContent`
    pub fn gemini_url(&self, action: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.gemini_base_url.trim_end_matches('/'),
            self.model,
            action
        )
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<CoachConfig> = Lazy::new(CoachConfig::from_env);
