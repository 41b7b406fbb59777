// src/materials/mod.rs

mod chapters;
mod lookup;
mod recommend;
mod store;

pub use chapters::{discussion_system_prompt, generate_chapter_summary};
pub use lookup::{BookLookupClient, BookMatch, VideoLookupClient, VideoMatch};
pub use recommend::{RecommendationEngine, parse_recommendations};
pub use store::{Book, MaterialFeedback, MaterialStore, NewBook, NewVideo, Video};
