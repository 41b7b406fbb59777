// src/api/http/mod.rs

pub mod auth;
pub mod chat;
pub mod goals;
pub mod handlers;
pub mod interview;
pub mod materials;
pub mod memory;
pub mod router;
pub mod stream;
pub mod user;

pub use router::http_router;
pub use stream::ChatEvent;
