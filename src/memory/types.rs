// src/memory/types.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::profile::ProfileKey;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One fact produced by the extraction pipeline. Profile fields and
/// generic memories are distinct variants so routing is an exhaustive
/// match, not string-prefix parsing downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedFact {
    ProfileField { key: ProfileKey, value: String },
    Memory { content: String },
}

/// Outcome of one extraction pass over a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Nothing,
    Facts(Vec<ExtractedFact>),
}

impl ExtractionOutcome {
    pub fn is_nothing(&self) -> bool {
        matches!(self, ExtractionOutcome::Nothing)
    }
}
