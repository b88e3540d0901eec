//! Career Coach Desktop - Rust Backend Library
//!
//! This library provides the desktop shell for the Career Coach application.
//! It includes:
//! - Tauri command handlers for frontend IPC
//! - Backend supervision wiring (startup, dialogs, shutdown)
//! - Event emission for the loading surface and chat streams
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Chat commands
    send_message, get_conversation,
    // Backend commands
    get_backend_status,
    // Health commands
    get_health,
};
pub use models::response::*;
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
