//! Backend Subprocess
//!
//! Spawning and handle management for the uvicorn server process. The
//! handle owns the child for its whole life: output pipes are taken once
//! and pumped into the shared log sink, exit status is polled without
//! blocking, and dropping an un-terminated handle best-effort kills the
//! child so no orphan outlives the application.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::logging::LogSink;

/// Handle to the running backend server process.
pub struct BackendProcess {
    child: Child,
    pid: Option<u32>,
}

impl BackendProcess {
    fn from_child(child: Child) -> Self {
        let pid = child.id();
        Self { child, pid }
    }

    /// OS process id, if the process has not already been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Kill the process and wait for it to be reaped.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }

    /// Take the stdout pipe. Returns `None` after the first call.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the stderr pipe. Returns `None` after the first call.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        // Best effort; the normal path kills explicitly before drop.
        let _ = self.child.start_kill();
    }
}

impl std::fmt::Debug for BackendProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendProcess")
            .field("pid", &self.pid)
            .finish()
    }
}

/// Spawn the uvicorn server with the venv interpreter.
///
/// Runs `python -m uvicorn main:app --host <host> --port <port>` with the
/// backend directory as working directory, stdin closed and both output
/// pipes captured.
pub fn spawn_server(config: &BackendConfig) -> BackendResult<BackendProcess> {
    let python = config.python_path();
    let port = config.port.to_string();

    let mut command = Command::new(&python);
    command
        .args(["-m", "uvicorn", "main:app", "--host", &config.host, "--port", &port])
        .current_dir(&config.backend_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match command.spawn() {
        Ok(child) => Ok(BackendProcess::from_child(child)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(BackendError::spawn(
            format!("Python executable not found at: {}", python.display()),
        )),
        Err(err) => Err(BackendError::spawn(format!(
            "Failed to start backend process: {}",
            err
        ))),
    }
}

/// Pump the process output pipes into the log sink, line by line.
///
/// stdout lines are logged as `Backend: <line>`, stderr lines as
/// `Backend Error: <line>` at error level. The pump tasks end on their own
/// when the pipes close.
pub fn pump_output(process: &mut BackendProcess, log: &Arc<LogSink>) {
    if let Some(stdout) = process.take_stdout() {
        let log = Arc::clone(log);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log.append(&format!("Backend: {}", line));
            }
        });
    }

    if let Some(stderr) = process.take_stderr() {
        let log = Arc::clone(log);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log.append_error(&format!("Backend Error: {}", line));
            }
        });
    }
}
