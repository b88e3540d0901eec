//! Chat Turn Orchestration
//!
//! Drives one user turn end to end: store the user message, open the
//! assistant placeholder, issue the streaming query, and forward stream
//! events to both the conversation store and the webview. The command
//! returns as soon as the turn is registered; tokens arrive as events.

use std::sync::Arc;

use tauri::Runtime;

use career_coach_backend::{BackendClient, ConversationStore, FileAttachment, StreamEvent};

use crate::models::response::{SendMessageRequest, SendMessageResponse};
use crate::services::events::AppEventEmitter;
use crate::utils::error::{AppError, AppResult};

/// Reject empty input before anything is stored or sent.
fn validate_message(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message content must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Read an attachment from disk into an upload part.
///
/// The file is read up front so the streaming request owns its bytes; an
/// unreadable path fails the send before any message is stored.
async fn load_attachment(path: &str) -> AppResult<FileAttachment> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::validation(format!("Could not read attached file {}: {}", path, e))
    })?;
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();
    Ok(FileAttachment::new(file_name, bytes))
}

/// Handles chat operations against the supervised backend
pub struct ChatService<R: Runtime> {
    /// Conversation store shared with the query commands
    conversation: Arc<ConversationStore>,
    /// HTTP client bound to the supervised backend
    client: BackendClient,
    /// Emitter for chat stream events
    emitter: AppEventEmitter<R>,
}

impl<R: Runtime> ChatService<R> {
    /// Create a new chat service
    pub fn new(
        conversation: Arc<ConversationStore>,
        client: BackendClient,
        emitter: AppEventEmitter<R>,
    ) -> Self {
        Self {
            conversation,
            client,
            emitter,
        }
    }

    /// Send a message and start streaming the reply.
    ///
    /// Stores the user message and an empty assistant placeholder, then
    /// spawns a task that issues the query and forwards each stream event
    /// in order: first into the store, then to the webview. The reply to
    /// the caller carries the placeholder id the events will reference.
    ///
    /// A turn always terminates: connection failures surface as one
    /// in-band `Failed` event on the same channel, never as a command
    /// error.
    pub async fn send_message(&self, request: SendMessageRequest) -> AppResult<SendMessageResponse> {
        let content = validate_message(&request.content)?;

        let attachment = match &request.file_path {
            Some(path) => Some(load_attachment(path).await?),
            None => None,
        };

        let user_message = self.conversation.push_user(content).await;
        // Snapshot before the placeholder exists so the backend never sees
        // the empty assistant entry
        let history = self.conversation.wire_history().await;
        let assistant_message_id = self.conversation.open_placeholder().await;

        let conversation = Arc::clone(&self.conversation);
        let client = self.client.clone();
        let emitter = self.emitter.clone();
        let message_id = assistant_message_id.clone();

        tokio::spawn(async move {
            let mut stream = client.stream_query(&history, attachment).await;
            while let Some(event) = stream.next_event().await {
                match &event {
                    StreamEvent::Token { text } => {
                        conversation.append_content(&message_id, text).await;
                    }
                    StreamEvent::Failed { notice } => {
                        conversation.append_content(&message_id, notice).await;
                    }
                    StreamEvent::Completed => {}
                }
                emitter.emit_chat_stream(&message_id, event);
            }
            conversation.seal(&message_id).await;
        });

        Ok(SendMessageResponse {
            user_message,
            assistant_message_id,
        })
    }
}
