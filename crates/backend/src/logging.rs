//! Application Log Sink
//!
//! Append-only log shared by the supervisor and the backend subprocess
//! output pumps. Every entry is one complete line in the form
//! `[ISO-8601 timestamp] message` (or `... ERROR: message`), written to the
//! log file and mirrored to the console: normal lines to stdout, error
//! lines to stderr. Writes from concurrent sources never interleave within
//! a line because each append holds the file lock for the whole line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};

use crate::error::BackendResult;

/// File-plus-console log sink.
///
/// Logging is an observability side effect, not a control-flow dependency:
/// appends never fail the caller, and a sink opened without a file still
/// mirrors to the console.
#[derive(Debug)]
pub struct LogSink {
    file: Mutex<Option<File>>,
}

impl LogSink {
    /// Open (or create) the log file at `path` in append mode.
    ///
    /// Parent directories are created if missing.
    pub fn open(path: &Path) -> BackendResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }

    /// Create a console-only sink with no backing file.
    pub fn disabled() -> Self {
        Self {
            file: Mutex::new(None),
        }
    }

    /// Append a normal log line.
    pub fn append(&self, message: &str) {
        self.write_line(message, false);
    }

    /// Append an error log line (`ERROR: ` prefix, mirrored to stderr).
    pub fn append_error(&self, message: &str) {
        self.write_line(message, true);
    }

    fn write_line(&self, message: &str, is_error: bool) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = if is_error {
            format!("[{}] ERROR: {}", timestamp, message.trim())
        } else {
            format!("[{}] {}", timestamp, message.trim())
        };

        if let Ok(mut guard) = self.file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }

        if is_error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}
