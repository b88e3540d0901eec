//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod chat;
pub mod events;
pub mod startup;

pub use chat::ChatService;
pub use events::{channels, AppEventEmitter, ChatStreamPayload};
