//! Tauri Event Emission System
//!
//! Real-time event emission from Rust to the frontend using Tauri's event
//! system: loading-surface updates during backend startup and per-message
//! chat stream events.

use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::sync::mpsc;

use career_coach_backend::{StartupNotice, StreamEvent};

/// Event channel names
pub mod channels {
    /// Loading surface text updates during startup
    pub const LOADING_UPDATE: &str = "loading-update";
    /// Hide the loading surface; the backend is ready
    pub const LOADING_HIDDEN: &str = "loading-hidden";
    /// Chat stream events (tokens, in-band failures, completion)
    pub const CHAT_STREAM: &str = "chat-stream";
}

/// Chat stream event payload
#[derive(Debug, Clone, Serialize)]
pub struct ChatStreamPayload {
    /// Id of the assistant placeholder this event belongs to
    pub message_id: String,
    /// The stream event
    pub event: StreamEvent,
}

/// Event emitter for application events
///
/// Wraps Tauri's AppHandle to provide typed event emission
/// with proper error handling (log failures, don't crash).
pub struct AppEventEmitter<R: Runtime> {
    app_handle: AppHandle<R>,
}

impl<R: Runtime> AppEventEmitter<R> {
    /// Create a new event emitter
    pub fn new(app_handle: AppHandle<R>) -> Self {
        Self { app_handle }
    }

    /// Emit a loading surface text update
    pub fn emit_loading_update(&self, message: &str) {
        if let Err(e) = self.app_handle.emit(channels::LOADING_UPDATE, message) {
            eprintln!("[WARN] Failed to emit loading update: {}", e);
        }
    }

    /// Emit the loading-hidden signal
    pub fn emit_loading_hidden(&self) {
        if let Err(e) = self.app_handle.emit(channels::LOADING_HIDDEN, ()) {
            eprintln!("[WARN] Failed to emit loading hidden: {}", e);
        }
    }

    /// Emit one chat stream event for a placeholder message
    pub fn emit_chat_stream(&self, message_id: &str, event: StreamEvent) {
        let payload = ChatStreamPayload {
            message_id: message_id.to_string(),
            event,
        };

        if let Err(e) = self.app_handle.emit(channels::CHAT_STREAM, &payload) {
            eprintln!(
                "[WARN] Failed to emit chat stream event for message {}: {}",
                message_id, e
            );
        }
    }

    /// Map a startup notice onto the loading surface events
    pub fn forward_startup_notice(&self, notice: StartupNotice) {
        match notice {
            StartupNotice::StatusUpdate(message) => self.emit_loading_update(&message),
            StartupNotice::Ready => self.emit_loading_hidden(),
        }
    }
}

impl<R: Runtime> Clone for AppEventEmitter<R> {
    fn clone(&self) -> Self {
        Self {
            app_handle: self.app_handle.clone(),
        }
    }
}

/// Forward startup notices to the webview until the channel closes.
///
/// The channel is fire-and-forget on the sending side; dropping the
/// receiver (app shutdown) just ends this task.
pub fn spawn_notice_forwarder<R: Runtime>(
    emitter: AppEventEmitter<R>,
    mut rx: mpsc::UnboundedReceiver<StartupNotice>,
) {
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            emitter.forward_startup_notice(notice);
        }
    });
}
