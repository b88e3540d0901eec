//! Backend HTTP Client
//!
//! Shared reqwest client for the two things the backend exposes: the
//! readiness probe (`GET /`) and the streaming query endpoint
//! (`POST /query`). The query request is multipart form data carrying the
//! JSON-serialized chronological history and, optionally, an attached file.

use std::time::Duration;

use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};

use crate::chat::WireMessage;
use crate::config::BackendConfig;
use crate::stream::{BoxError, QueryStream};

/// Per-probe timeout; a hung probe counts as "not ready yet".
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Multipart field name for the serialized conversation history.
pub const CONVERSATION_FIELD: &str = "conversation_json";
/// Multipart field name for the optional file upload.
pub const FILE_FIELD: &str = "file";

/// A file uploaded alongside a query.
///
/// The backend branches on the MIME type to extract PDF and DOCX text, so
/// the type is inferred from the file name rather than left generic.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for_name(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// MIME type for an uploaded file, by extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// HTTP client bound to one backend instance.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    probe_url: String,
    query_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build reqwest client");
        Self {
            http,
            probe_url: config.probe_url(),
            query_url: config.query_url(),
        }
    }

    /// One readiness probe. Success means HTTP 200 exactly; connection
    /// errors, timeouts, and every other status all mean "not ready yet".
    pub async fn probe_ready(&self) -> bool {
        match self
            .http
            .get(&self.probe_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Issue one streaming query.
    ///
    /// Exactly one request is sent per call — no retries. The returned
    /// stream never rejects: a connection that cannot be established (or a
    /// request that cannot be built) becomes a stream whose single event is
    /// the in-band failure notice. The response body is streamed regardless
    /// of status code, matching the endpoint's habit of delivering its own
    /// error text as a streamed body.
    pub async fn stream_query(
        &self,
        history: &[WireMessage],
        attachment: Option<FileAttachment>,
    ) -> QueryStream {
        let conversation_json = match serde_json::to_string(history) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!("failed to serialize conversation history: {}", err);
                return QueryStream::connect_failed();
            }
        };

        let mut form = Form::new().text(CONVERSATION_FIELD, conversation_json);
        if let Some(attachment) = attachment {
            let part = Part::bytes(attachment.bytes).file_name(attachment.file_name);
            let part = match part.mime_str(&attachment.content_type) {
                Ok(part) => part,
                Err(err) => {
                    tracing::error!("invalid attachment content type: {}", err);
                    return QueryStream::connect_failed();
                }
            };
            form = form.part(FILE_FIELD, part);
        }

        match self.http.post(&self.query_url).multipart(form).send().await {
            Ok(response) => QueryStream::from_body(Box::pin(
                response.bytes_stream().map_err(|e| Box::new(e) as BoxError),
            )),
            Err(err) => {
                tracing::warn!("query request failed: {}", err);
                QueryStream::connect_failed()
            }
        }
    }
}
