//! Tauri Commands
//!
//! Contains all Tauri command handlers that can be called from the frontend.
//! These are the IPC entry points for the application.

pub mod backend;
pub mod chat;
pub mod health;

pub use backend::*;
pub use chat::*;
pub use health::*;
