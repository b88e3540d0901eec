//! Streaming Query Events
//!
//! A query against the backend produces a `QueryStream`: a lazy, finite,
//! non-restartable sequence of events pulled one at a time. Text arrives as
//! `Token` events in strict arrival order; the stream then ends with exactly
//! one terminal event — `Completed` when the server closes the connection,
//! or `Failed` carrying the in-band error notice when the transport breaks.
//! A `QueryStream` never surfaces an `Err`: stream failure is part of the
//! conversation, not an exceptional path.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::decode::Utf8Decoder;

/// Notice appended to the in-progress message when the backend cannot be
/// reached or the response stream breaks.
pub const CONNECT_ERROR_NOTICE: &str = "\n\n[Error: Could not connect to the AI server.]";

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub(crate) type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// One event of a streaming query, as delivered to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Decoded text fragment, in strict arrival order
    Token { text: String },

    /// Terminal: transport failure, with the notice to append to the message
    Failed { notice: String },

    /// Terminal: the server closed the stream normally
    Completed,
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Completed)
    }
}

/// Lazy event sequence for one streaming query.
///
/// Pull-based: the next byte chunk is requested from the transport only
/// when `next_event` is awaited, so delivery is strictly sequential and
/// nothing is buffered beyond the bytes needed to decode one chunk. After a
/// terminal event every further call returns `None`.
pub struct QueryStream {
    body: Option<ByteStream>,
    decoder: Utf8Decoder,
    pending: Option<StreamEvent>,
    done: bool,
}

impl QueryStream {
    /// Stream over a live response body.
    pub(crate) fn from_body(body: ByteStream) -> Self {
        Self {
            body: Some(body),
            decoder: Utf8Decoder::new(),
            pending: None,
            done: false,
        }
    }

    /// Stream whose only event is the connect-failure notice.
    pub(crate) fn connect_failed() -> Self {
        Self {
            body: None,
            decoder: Utf8Decoder::new(),
            pending: Some(StreamEvent::Failed {
                notice: CONNECT_ERROR_NOTICE.to_string(),
            }),
            done: false,
        }
    }

    /// Pull the next event, or `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.done {
            return None;
        }
        if let Some(event) = self.pending.take() {
            if event.is_terminal() {
                self.done = true;
            }
            return Some(event);
        }

        loop {
            let item = match self.body.as_mut() {
                Some(body) => body.next().await,
                None => None,
            };
            match item {
                Some(Ok(chunk)) => {
                    let text = self.decoder.decode(&chunk);
                    if text.is_empty() {
                        // Chunk ended mid-character; pull the next one
                        continue;
                    }
                    return Some(StreamEvent::Token { text });
                }
                Some(Err(err)) => {
                    tracing::warn!("response stream aborted: {}", err);
                    self.done = true;
                    return Some(StreamEvent::Failed {
                        notice: CONNECT_ERROR_NOTICE.to_string(),
                    });
                }
                None => {
                    let tail = self.decoder.flush();
                    if tail.is_empty() {
                        self.done = true;
                        return Some(StreamEvent::Completed);
                    }
                    self.pending = Some(StreamEvent::Completed);
                    return Some(StreamEvent::Token { text: tail });
                }
            }
        }
    }

    /// Drive the stream to completion, collecting every event.
    ///
    /// Mostly useful for non-incremental callers and tests; interactive
    /// consumers should pull events one at a time.
    pub async fn collect_events(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }
}

impl std::fmt::Debug for QueryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryStream")
            .field("live", &self.body.is_some())
            .field("done", &self.done)
            .finish()
    }
}
