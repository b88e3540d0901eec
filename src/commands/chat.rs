//! Chat Commands
//!
//! Tauri commands for the conversation surface.

use tauri::{AppHandle, State};

use career_coach_backend::ConversationMessage;

use crate::models::response::{CommandResponse, SendMessageRequest, SendMessageResponse};
use crate::services::chat::ChatService;
use crate::services::events::AppEventEmitter;
use crate::state::AppState;

/// Send a user message and start streaming the assistant reply
///
/// This command only registers the turn; the reply body arrives as
/// `chat-stream` events keyed by the returned placeholder id. Connection
/// failures show up in-band on that stream, not as a command error.
#[tauri::command]
pub async fn send_message(
    request: SendMessageRequest,
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<CommandResponse<SendMessageResponse>, String> {
    let supervisor = match state.supervisor().await {
        Ok(supervisor) => supervisor,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };

    let service = ChatService::new(
        state.conversation(),
        supervisor.client(),
        AppEventEmitter::new(app),
    );

    match service.send_message(request).await {
        Ok(response) => Ok(CommandResponse::ok(response)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Get the conversation as stored (newest first)
#[tauri::command]
pub async fn get_conversation(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Vec<ConversationMessage>>, String> {
    Ok(CommandResponse::ok(state.conversation().messages().await))
}
