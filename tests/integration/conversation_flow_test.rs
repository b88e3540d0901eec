//! Conversation Flow Integration Tests
//!
//! Tests for the conversation store driven the way the chat service drives
//! it during a streaming turn: user message, history snapshot, assistant
//! placeholder, token appends, seal. Covers ordering guarantees on both the
//! stored (newest-first) and wire (chronological) sides, and the in-band
//! failure notice landing inside the affected message.

use career_coach_backend::{
    ConversationStore, Role, StreamEvent, WireMessage, CONNECT_ERROR_NOTICE,
};

// ============================================================================
// Helpers
// ============================================================================

/// Drive one complete turn the way the chat service does: push the user
/// message, snapshot the wire history, open the placeholder, then feed it
/// the given stream events and seal it. Returns (placeholder id, snapshot).
async fn run_turn(
    store: &ConversationStore,
    user_text: &str,
    events: Vec<StreamEvent>,
) -> (String, Vec<WireMessage>) {
    store.push_user(user_text).await;
    // Snapshot before the placeholder exists, matching the request order
    let snapshot = store.wire_history().await;
    let id = store.open_placeholder().await;
    for event in events {
        match event {
            StreamEvent::Token { text } => {
                store.append_content(&id, &text).await;
            }
            StreamEvent::Failed { notice } => {
                store.append_content(&id, &notice).await;
            }
            StreamEvent::Completed => {}
        }
    }
    store.seal(&id).await;
    (id, snapshot)
}

fn token(text: &str) -> StreamEvent {
    StreamEvent::Token {
        text: text.to_string(),
    }
}

// ============================================================================
// Turn Structure Tests
// ============================================================================

#[tokio::test]
async fn test_turn_adds_user_message_and_placeholder() {
    let store = ConversationStore::new();

    let (id, _) = run_turn(&store, "What roles fit my background?", vec![]).await;

    let messages = store.messages().await;
    assert_eq!(messages.len(), 2);
    // Newest first: the placeholder sits above the user message
    assert_eq!(messages[0].id, id);
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "What roles fit my background?");
}

#[tokio::test]
async fn test_history_snapshot_excludes_own_placeholder() {
    let store = ConversationStore::new();

    let (_, snapshot) = run_turn(&store, "hello", vec![token("hi")]).await;

    // The request that created the placeholder must not include it
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].role, Role::User);
    assert_eq!(snapshot[0].content, "hello");
}

#[tokio::test]
async fn test_second_turn_sees_completed_first_answer() {
    let store = ConversationStore::new();

    run_turn(&store, "first", vec![token("one "), token("answer")]).await;
    let (_, snapshot) = run_turn(&store, "second", vec![token("ok")]).await;

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot[0].content, "first");
    assert_eq!(snapshot[1].role, Role::Assistant);
    assert_eq!(snapshot[1].content, "one answer");
    assert_eq!(snapshot[2].content, "second");
}

#[tokio::test]
async fn test_stored_order_is_newest_first_across_turns() {
    let store = ConversationStore::new();

    run_turn(&store, "q1", vec![token("a1")]).await;
    run_turn(&store, "q2", vec![token("a2")]).await;
    run_turn(&store, "q3", vec![token("a3")]).await;

    let messages = store.messages().await;
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[0].content, "a3");
    assert_eq!(messages[1].content, "q3");
    assert_eq!(messages[4].content, "a1");
    assert_eq!(messages[5].content, "q1");

    // Wire side is the exact reverse
    let wire = store.wire_history().await;
    assert_eq!(wire[0].content, "q1");
    assert_eq!(wire[5].content, "a3");
}

// ============================================================================
// Token Assembly Tests
// ============================================================================

#[tokio::test]
async fn test_tokens_assemble_in_arrival_order() {
    let store = ConversationStore::new();

    let (id, _) = run_turn(
        &store,
        "question",
        vec![token("Your "), token("resume "), token("looks "), token("strong.")],
    )
    .await;

    assert_eq!(
        store.content_of(&id).await.unwrap(),
        "Your resume looks strong."
    );
}

#[tokio::test]
async fn test_sealed_answer_rejects_late_tokens() {
    let store = ConversationStore::new();

    let (id, _) = run_turn(&store, "question", vec![token("done")]).await;

    assert!(!store.append_content(&id, " straggler").await);
    assert_eq!(store.content_of(&id).await.unwrap(), "done");
}

// ============================================================================
// In-Band Failure Tests
// ============================================================================

#[tokio::test]
async fn test_connect_failure_notice_lands_in_message_content() {
    let store = ConversationStore::new();

    let (id, _) = run_turn(
        &store,
        "question",
        vec![StreamEvent::Failed {
            notice: CONNECT_ERROR_NOTICE.to_string(),
        }],
    )
    .await;

    assert_eq!(
        store.content_of(&id).await.unwrap(),
        "\n\n[Error: Could not connect to the AI server.]"
    );
    assert!(!store.is_open(&id).await);
}

#[tokio::test]
async fn test_mid_stream_failure_appends_notice_after_partial_text() {
    let store = ConversationStore::new();

    let (id, _) = run_turn(
        &store,
        "question",
        vec![
            token("Here is the start of an ans"),
            StreamEvent::Failed {
                notice: CONNECT_ERROR_NOTICE.to_string(),
            },
        ],
    )
    .await;

    let content = store.content_of(&id).await.unwrap();
    assert!(content.starts_with("Here is the start of an ans"));
    assert!(content.ends_with("[Error: Could not connect to the AI server.]"));
}

#[tokio::test]
async fn test_failed_turn_stays_in_history_for_next_request() {
    let store = ConversationStore::new();

    run_turn(
        &store,
        "question",
        vec![StreamEvent::Failed {
            notice: CONNECT_ERROR_NOTICE.to_string(),
        }],
    )
    .await;
    let (_, snapshot) = run_turn(&store, "retry", vec![]).await;

    // The failed assistant message is part of the record, notice and all
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot[1].content.contains("[Error:"));
}

// ============================================================================
// Wire Format Tests
// ============================================================================

#[tokio::test]
async fn test_wire_history_serializes_to_conversation_json() {
    let store = ConversationStore::new();
    run_turn(&store, "hello", vec![token("hi there")]).await;

    let json = serde_json::to_string(&store.wire_history().await).unwrap();
    assert_eq!(
        json,
        r#"[{"role":"user","content":"hello"},{"role":"assistant","content":"hi there"}]"#
    );
}
