//! Backend Supervisor Lifecycle Integration Tests
//!
//! Tests driving the supervisor through the public surface the desktop app
//! uses: start, status snapshots, startup notices, querying through the
//! supervisor's client once ready, and terminate. A routing stub stands in
//! for the real server, answering both the readiness probe and the query
//! endpoint on the same port.

use std::sync::Arc;

use career_coach_backend::{
    BackendConfig, BackendError, BackendProcessState, BackendSupervisor, LogSink, Role,
    StartupNotice, StartupNotifier, StreamEvent, WireMessage,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ============================================================================
// Helpers
// ============================================================================

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        let n = socket.read(&mut tmp).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() - (pos + 4) >= content_length {
                break;
            }
        }
    }
    buf
}

/// Stub backend server: answers the readiness probe on `GET /` and streams
/// a fixed reply on `POST /query`. Returns the bound port.
async fn spawn_backend_stub() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            if request.starts_with(b"POST /query") {
                let head = "HTTP/1.1 200 OK\r\n\
                            content-type: text/event-stream\r\n\
                            transfer-encoding: chunked\r\n\
                            connection: close\r\n\r\n";
                socket.write_all(head.as_bytes()).await.unwrap();
                for part in [&b"Hello"[..], b" from", b" the stub"] {
                    let frame = format!("{:X}\r\n", part.len());
                    socket.write_all(frame.as_bytes()).await.unwrap();
                    socket.write_all(part).await.unwrap();
                    socket.write_all(b"\r\n").await.unwrap();
                    socket.flush().await.unwrap();
                }
                socket.write_all(b"0\r\n\r\n").await.unwrap();
            } else {
                let response =
                    "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
                socket.write_all(response.as_bytes()).await.unwrap();
            }
            socket.flush().await.unwrap();
        }
    });
    port
}

/// Stub that never becomes ready.
async fn spawn_unready_stub() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response =
                "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });
    port
}

/// Executable stand-in for the venv interpreter plus the provisioning
/// marker, so startup skips provisioning and goes straight to the spawn.
#[cfg(unix)]
fn install_fake_backend(config: &BackendConfig) {
    use std::os::unix::fs::PermissionsExt;
    let python = config.python_path();
    std::fs::create_dir_all(python.parent().unwrap()).unwrap();
    std::fs::write(&python, "#!/bin/sh\nexec sleep 30\n").unwrap();
    let mut perms = std::fs::metadata(&python).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&python, perms).unwrap();
    std::fs::write(config.marker_path(), "stamp\n").unwrap();
}

fn fast_config(backend_dir: &std::path::Path, port: u16, max_attempts: u32) -> BackendConfig {
    BackendConfig {
        backend_dir: backend_dir.to_path_buf(),
        port,
        poll_interval_ms: 10,
        max_poll_attempts: max_attempts,
        ..Default::default()
    }
}

fn supervisor_with(
    config: BackendConfig,
) -> (
    Arc<BackendSupervisor>,
    tokio::sync::mpsc::UnboundedReceiver<StartupNotice>,
) {
    let (notifier, rx) = StartupNotifier::channel();
    let supervisor = Arc::new(BackendSupervisor::new(
        config,
        Arc::new(LogSink::disabled()),
        notifier,
    ));
    (supervisor, rx)
}

// ============================================================================
// Status Snapshot Tests
// ============================================================================

#[tokio::test]
async fn test_initial_status_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let (supervisor, _rx) = supervisor_with(fast_config(dir.path(), 9, 3));

    let status = supervisor.status().await;
    assert!(!status.ready);
    assert_eq!(status.state, "not_started");
    assert!(status.detail.is_none());

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["ready"], false);
    assert_eq!(json["state"], "not_started");
    assert!(json["detail"].is_null());
}

// ============================================================================
// Fatal Startup Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_backend_dir_is_fatal_and_start_is_single_shot() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-installed");
    let (supervisor, _rx) = supervisor_with(fast_config(&missing, 9, 3));

    let err = supervisor.start().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Backend directory not found at:"));

    let status = supervisor.status().await;
    assert_eq!(status.state, "failed");

    // One start per supervisor, even after failure
    let err = supervisor.start().await.unwrap_err();
    assert!(matches!(err, BackendError::AlreadyRunning));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_terminate_before_start_wins() {
    let dir = tempfile::tempdir().unwrap();
    let (supervisor, _rx) = supervisor_with(fast_config(dir.path(), 9, 3));

    supervisor.terminate().await;
    assert_eq!(supervisor.state().await, BackendProcessState::Terminated);

    let err = supervisor.start().await.unwrap_err();
    assert!(matches!(err, BackendError::AlreadyRunning));
}

// ============================================================================
// Full Lifecycle Tests
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_started_backend_serves_queries_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let port = spawn_backend_stub().await;
    let config = fast_config(dir.path(), port, 30);
    install_fake_backend(&config);
    let (supervisor, mut rx) = supervisor_with(config);

    supervisor.start().await.unwrap();
    assert_eq!(supervisor.state().await, BackendProcessState::Ready);

    // Loading surface heard the startup sequence in order
    assert_eq!(
        rx.recv().await,
        Some(StartupNotice::StatusUpdate(
            "Starting AI backend...".to_string()
        ))
    );
    assert_eq!(rx.recv().await, Some(StartupNotice::Ready));

    // The supervisor's client reaches the running backend
    let history = vec![WireMessage {
        role: Role::User,
        content: "hello".to_string(),
    }];
    let events = supervisor
        .client()
        .stream_query(&history, None)
        .await
        .collect_events()
        .await;
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Token { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello from the stub");
    assert_eq!(events.last(), Some(&StreamEvent::Completed));

    supervisor.terminate().await;
    assert_eq!(supervisor.state().await, BackendProcessState::Terminated);
    // Idempotent shutdown
    supervisor.terminate().await;
    assert_eq!(supervisor.state().await, BackendProcessState::Terminated);
}

#[cfg(unix)]
#[tokio::test]
async fn test_readiness_timeout_is_degraded_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let port = spawn_unready_stub().await;
    let config = fast_config(dir.path(), port, 2);
    install_fake_backend(&config);
    let (supervisor, _rx) = supervisor_with(config);

    let err = supervisor.start().await.unwrap_err();
    assert!(matches!(err, BackendError::ReadinessTimeout { attempts: 2 }));
    assert!(!err.is_fatal());

    let status = supervisor.status().await;
    assert!(!status.ready);
    assert_eq!(status.state, "failed");
    assert_eq!(
        status.detail.as_deref(),
        Some("Backend did not start within the expected time.")
    );

    supervisor.terminate().await;
}
