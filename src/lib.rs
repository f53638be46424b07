// Crate root library declaration and module exports.
pub mod board;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod model;
pub mod session;
pub mod storage;

// --- ANDROID SUPPORT ---
#[cfg(feature = "mobile")]
pub mod mobile;

#[cfg(feature = "mobile")]
uniffi::setup_scaffolding!();
