// src/auth/mod.rs

mod extract;
mod jwt;
mod models;
mod password;
mod service;

pub use extract::AuthUser;
pub use jwt::{Claims, create_token, verify_token};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, User};
pub use password::{hash_password, verify_password};
pub use service::AuthService;
