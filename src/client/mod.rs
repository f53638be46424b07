// File: ./src/client/mod.rs
pub mod auth;
pub mod core;
pub mod middleware;
pub mod types;

pub use crate::client::core::{ApiClient, ensure_https};
pub use crate::client::types::{ImageUpload, ItemDraft, Registration};
