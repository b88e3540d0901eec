//! IPC Envelope Integration Tests
//!
//! Tests for the serialized shapes crossing the IPC boundary: command
//! response envelopes, send-message request/response payloads, chat stream
//! event payloads, and backend status snapshots. The frontend switches on
//! these exact field names and tag values.

use career_coach_backend::{
    BackendError, ConversationMessage, Role, StreamEvent, CONNECT_ERROR_NOTICE,
};
use career_coach_desktop::models::response::{
    CommandResponse, HealthResponse, SendMessageRequest, SendMessageResponse,
};
use career_coach_desktop::services::ChatStreamPayload;
use career_coach_desktop::utils::error::AppError;

// ============================================================================
// CommandResponse Tests
// ============================================================================

#[test]
fn test_command_response_ok_json_shape() {
    let response = CommandResponse::ok(vec!["a".to_string(), "b".to_string()]);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0], "a");
    assert!(json["error"].is_null());
}

#[test]
fn test_command_response_err_json_shape() {
    let response: CommandResponse<()> = CommandResponse::err("backend not ready");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], false);
    assert!(json["data"].is_null());
    assert_eq!(json["error"], "backend not ready");
}

#[test]
fn test_command_response_from_app_result() {
    let ok: Result<u32, AppError> = Ok(7);
    let response = CommandResponse::from(ok);
    assert!(response.success);
    assert_eq!(response.data, Some(7));

    let err: Result<u32, AppError> = Err(AppError::validation("Message cannot be empty"));
    let response = CommandResponse::from(err);
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Validation error: Message cannot be empty")
    );
}

#[test]
fn test_backend_errors_surface_without_extra_wrapping() {
    let err: Result<(), AppError> = Err(BackendError::spawn(
        "Python executable not found at: /opt/career-app/venv/bin/python",
    )
    .into());
    let response = CommandResponse::from(err);

    // One prefix, from the engine error itself
    assert_eq!(
        response.error.as_deref(),
        Some("Spawn error: Python executable not found at: /opt/career-app/venv/bin/python")
    );
}

// ============================================================================
// Send Message Payload Tests
// ============================================================================

#[test]
fn test_send_message_request_minimal_payload() {
    let request: SendMessageRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();
    assert_eq!(request.content, "hello");
    assert!(request.file_path.is_none());
}

#[test]
fn test_send_message_request_with_attachment_path() {
    let request: SendMessageRequest =
        serde_json::from_str(r#"{"content":"review this","file_path":"/tmp/resume.pdf"}"#)
            .unwrap();
    assert_eq!(request.file_path.as_deref(), Some("/tmp/resume.pdf"));
}

#[test]
fn test_send_message_response_json_shape() {
    let user_message = ConversationMessage::new(Role::User, "hello");
    let response = SendMessageResponse {
        user_message: user_message.clone(),
        assistant_message_id: "assistant-123".to_string(),
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["user_message"]["id"], user_message.id);
    assert_eq!(json["user_message"]["role"], "user");
    assert_eq!(json["user_message"]["content"], "hello");
    assert!(json["user_message"]["timestamp"].is_string());
    assert_eq!(json["assistant_message_id"], "assistant-123");
}

// ============================================================================
// Chat Stream Payload Tests
// ============================================================================

#[test]
fn test_chat_stream_token_payload() {
    let payload = ChatStreamPayload {
        message_id: "assistant-42".to_string(),
        event: StreamEvent::Token {
            text: "Hel".to_string(),
        },
    };

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["message_id"], "assistant-42");
    assert_eq!(json["event"]["type"], "token");
    assert_eq!(json["event"]["text"], "Hel");
}

#[test]
fn test_chat_stream_failure_payload_carries_notice() {
    let payload = ChatStreamPayload {
        message_id: "assistant-42".to_string(),
        event: StreamEvent::Failed {
            notice: CONNECT_ERROR_NOTICE.to_string(),
        },
    };

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["event"]["type"], "failed");
    assert_eq!(
        json["event"]["notice"],
        "\n\n[Error: Could not connect to the AI server.]"
    );
}

#[test]
fn test_chat_stream_completed_payload() {
    let payload = ChatStreamPayload {
        message_id: "assistant-42".to_string(),
        event: StreamEvent::Completed,
    };

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["event"]["type"], "completed");
}

// ============================================================================
// Health Response Tests
// ============================================================================

#[test]
fn test_health_response_json_keys() {
    let health = HealthResponse::default();
    let json = serde_json::to_value(&health).unwrap();

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "career-coach-desktop");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["backend_ready"], false);
}
