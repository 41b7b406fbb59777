// src/state.rs

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::chat::ChatStore;
use crate::goals::GoalStore;
use crate::interview::CompletionPolicy;
use crate::llm::TextGenerator;
use crate::materials::{MaterialStore, RecommendationEngine};
use crate::memory::{MemoryExtractor, MemoryStore};
use crate::profile::ProfileStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,

    // -------- Storage --------
    pub chats: Arc<ChatStore>,
    pub memories: Arc<MemoryStore>,
    pub profiles: Arc<ProfileStore>,
    pub goals: Arc<GoalStore>,
    pub materials: Arc<MaterialStore>,

    // -------- Services --------
    pub auth_service: Arc<AuthService>,
    pub llm: Arc<dyn TextGenerator>,
    pub extractor: Arc<MemoryExtractor>,
    pub recommender: Arc<RecommendationEngine>,
    pub completion_policy: Arc<CompletionPolicy>,
}

impl AppState {
    pub fn new(db: SqlitePool, llm: Arc<dyn TextGenerator>) -> Self {
        let chats = Arc::new(ChatStore::new(db.clone()));
        let memories = Arc::new(MemoryStore::new(db.clone()));
        let profiles = Arc::new(ProfileStore::new(db.clone()));
        let goals = Arc::new(GoalStore::new(db.clone()));
        let materials = Arc::new(MaterialStore::new(db.clone()));

        let auth_service = Arc::new(AuthService::new(db.clone()));
        let extractor = Arc::new(MemoryExtractor::new(
            llm.clone(),
            memories.clone(),
            profiles.clone(),
        ));
        let recommender = Arc::new(RecommendationEngine::new(llm.clone(), materials.clone()));
        let completion_policy = Arc::new(CompletionPolicy::from_config());

        Self {
            db,
            chats,
            memories,
            profiles,
            goals,
            materials,
            auth_service,
            llm,
            extractor,
            recommender,
            completion_policy,
        }
    }
}
