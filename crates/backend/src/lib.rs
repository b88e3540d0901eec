//! Career Coach Backend Engine
//!
//! Supervision and streaming client for the bundled Python backend of the
//! Career Coach desktop app. This crate has no dependency on the desktop
//! shell (Tauri, windows, dialogs); the desktop crate wires these pieces
//! to events and commands.
//!
//! ## Module Organization
//!
//! - `error` - Engine error types (`BackendError`, `BackendResult`)
//! - `config` - Backend location, ports, and polling settings
//! - `logging` - Timestamped file-plus-console log sink
//! - `notify` - Startup progress channel (`StatusUpdate` / `Ready`)
//! - `provision` - One-time Python venv and dependency setup
//! - `process` - uvicorn subprocess handle and output pumping
//! - `supervisor` - Lifecycle state machine owning the single server process
//! - `client` - Readiness probe and multipart `/query` request
//! - `decode` - Incremental UTF-8 decoding across chunk boundaries
//! - `stream` - Ordered token stream with in-band failure
//! - `chat` - Conversation messages and history store
//!
//! ## Design Principles
//!
//! 1. **One process, one owner** - the supervisor holds the only handle to
//!    the spawned server and refuses to start a second one
//! 2. **Failures flow in-band** - query streams resolve with an error token
//!    instead of rejecting, so the chat surface has a single event shape
//! 3. **Fire-and-forget progress** - startup notices never block or fail
//!    the sender, whether or not anything is listening

pub mod chat;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod logging;
pub mod notify;
pub mod process;
pub mod provision;
pub mod stream;
pub mod supervisor;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{BackendError, BackendResult};

// ── Configuration ──────────────────────────────────────────────────────
pub use config::BackendConfig;

// ── Logging ────────────────────────────────────────────────────────────
pub use logging::LogSink;

// ── Startup Notices ────────────────────────────────────────────────────
pub use notify::{StartupNotice, StartupNotifier};

// ── Supervision ────────────────────────────────────────────────────────
pub use supervisor::{BackendProcessState, BackendStatus, BackendSupervisor};

// ── Query Streaming ────────────────────────────────────────────────────
pub use client::{BackendClient, FileAttachment};
pub use stream::{QueryStream, StreamEvent, CONNECT_ERROR_NOTICE};

// ── Conversation ───────────────────────────────────────────────────────
pub use chat::{ConversationMessage, ConversationStore, Role, WireMessage};
