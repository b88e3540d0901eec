//! Conversation Model
//!
//! Messages, their wire form, and the in-memory conversation store. The
//! store keeps messages in reverse-insertion order (newest first, the way
//! the UI renders them) and reconstructs chronological order whenever a
//! query is sent — the backend is stateless and receives the full history
//! every time.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Who authored a message. These are the only roles the wire format allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Generate an opaque message id, role-tagged for readability.
pub fn generate_message_id(role: Role) -> String {
    format!("{}-{}", role.as_str(), Uuid::new_v4())
}

/// One message of the conversation as held by the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(role),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Project to the wire form sent to the backend.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// `{role, content}` pair as serialized into the `conversation_json`
/// multipart field, chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Reverse-insertion order: index 0 is the newest message
    messages: Vec<ConversationMessage>,
    /// Ids of placeholder messages still receiving stream tokens
    open: HashSet<String>,
}

/// In-memory conversation store for the current session.
///
/// History is never pruned within a session and grows by exactly two
/// entries per user turn: the user message and the assistant placeholder.
/// Placeholders accept appends only while open; sealing is final.
#[derive(Debug, Default)]
pub struct ConversationStore {
    inner: RwLock<StoreInner>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user message, returning the stored copy.
    pub async fn push_user(&self, content: impl Into<String>) -> ConversationMessage {
        let message = ConversationMessage::new(Role::User, content);
        let mut inner = self.inner.write().await;
        inner.messages.insert(0, message.clone());
        message
    }

    /// Add an empty assistant placeholder and mark it open for streaming.
    ///
    /// The returned id is created before any request is sent, so stream
    /// events can target the placeholder unambiguously.
    pub async fn open_placeholder(&self) -> String {
        let message = ConversationMessage::new(Role::Assistant, "");
        let id = message.id.clone();
        let mut inner = self.inner.write().await;
        inner.messages.insert(0, message);
        inner.open.insert(id.clone());
        id
    }

    /// Append a fragment to an open placeholder.
    ///
    /// Returns false (and changes nothing) for sealed or unknown ids.
    pub async fn append_content(&self, id: &str, fragment: &str) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.open.contains(id) {
            return false;
        }
        match inner.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Seal a placeholder: no further mutation is accepted.
    pub async fn seal(&self, id: &str) {
        let mut inner = self.inner.write().await;
        inner.open.remove(id);
    }

    /// Whether a placeholder is still receiving tokens.
    pub async fn is_open(&self, id: &str) -> bool {
        self.inner.read().await.open.contains(id)
    }

    /// Content of a message by id, if present.
    pub async fn content_of(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.content.clone())
    }

    /// All messages in stored (newest-first) order.
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.inner.read().await.messages.clone()
    }

    /// Chronological wire history for transmission to the backend.
    pub async fn wire_history(&self) -> Vec<WireMessage> {
        self.inner
            .read()
            .await
            .messages
            .iter()
            .rev()
            .map(ConversationMessage::to_wire)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
