//! Backend Supervisor
//!
//! Owns the backend server lifecycle end to end: provision the Python
//! environment, spawn the uvicorn process, poll until it answers, then
//! hold the only handle to it until shutdown. The lifecycle is a one-way
//! state machine; at most one server process ever exists per supervisor,
//! and a second start attempt is rejected instead of spawning a sibling.

use std::process::ExitStatus;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::logging::LogSink;
use crate::notify::StartupNotifier;
use crate::process::{pump_output, spawn_server, BackendProcess};
use crate::provision;

/// How often the exit monitor polls the child for an exit status.
const EXIT_POLL_INTERVAL_MS: u64 = 2000;

/// Lifecycle states of the supervised backend.
///
/// Transitions only move forward: `NotStarted` through the startup states
/// to `Ready`, and from anywhere to the terminal `Failed` or `Terminated`.
/// There is no restart edge; a failed backend stays failed for the rest of
/// the application's life.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendProcessState {
    NotStarted,
    Provisioning,
    Starting,
    Polling,
    Ready,
    Failed(String),
    Terminated,
}

impl BackendProcessState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Provisioning => "provisioning",
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
            Self::Terminated => "terminated",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Snapshot of the backend state, shaped for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub ready: bool,
    pub state: String,
    pub detail: Option<String>,
}

/// Supervisor owning the single backend server process.
pub struct BackendSupervisor {
    config: BackendConfig,
    client: BackendClient,
    log: Arc<LogSink>,
    notifier: StartupNotifier,
    state: RwLock<BackendProcessState>,
    process: Mutex<Option<BackendProcess>>,
    shutdown: CancellationToken,
}

impl BackendSupervisor {
    pub fn new(config: BackendConfig, log: Arc<LogSink>, notifier: StartupNotifier) -> Self {
        let client = BackendClient::new(&config);
        Self {
            config,
            client,
            log,
            notifier,
            state: RwLock::new(BackendProcessState::NotStarted),
            process: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Client bound to this backend, for issuing queries.
    pub fn client(&self) -> BackendClient {
        self.client.clone()
    }

    pub async fn state(&self) -> BackendProcessState {
        self.state.read().await.clone()
    }

    /// Non-blocking readiness check, for health endpoints.
    pub fn try_is_ready(&self) -> bool {
        self.state
            .try_read()
            .map(|state| state.is_ready())
            .unwrap_or(false)
    }

    pub async fn status(&self) -> BackendStatus {
        let state = self.state().await;
        let detail = match &state {
            BackendProcessState::Failed(detail) => Some(detail.clone()),
            _ => None,
        };
        BackendStatus {
            ready: state.is_ready(),
            state: state.name().to_string(),
            detail,
        }
    }

    /// Move to `next` unless the supervisor has already been terminated.
    ///
    /// Returns whether the transition was applied. `Terminated` wins every
    /// race: a shutdown that lands mid-startup must not be overwritten by a
    /// late startup transition.
    async fn transition(&self, next: BackendProcessState) -> bool {
        let mut state = self.state.write().await;
        if matches!(*state, BackendProcessState::Terminated) {
            return false;
        }
        *state = next;
        true
    }

    async fn fail(&self, detail: String) {
        self.transition(BackendProcessState::Failed(detail)).await;
    }

    /// Start the backend: provision, spawn, and poll until it answers.
    ///
    /// Returns once the backend is ready or startup has failed. Only the
    /// first call ever proceeds; later calls (from any state) fail with
    /// `AlreadyRunning`.
    pub async fn start(&self) -> BackendResult<()> {
        {
            let mut state = self.state.write().await;
            if *state != BackendProcessState::NotStarted {
                return Err(BackendError::AlreadyRunning);
            }
            *state = BackendProcessState::Provisioning;
        }

        self.log
            .append(&format!("Server path: {}", self.config.backend_dir.display()));

        if let Err(err) = provision::provision_environment(&self.config, &self.log, &self.notifier).await
        {
            self.log.append_error(&err.to_string());
            self.fail(err.to_string()).await;
            return Err(err);
        }

        self.transition(BackendProcessState::Starting).await;
        self.notifier.status("Starting AI backend...");
        self.log.append(&format!(
            "Attempting to start backend with: {}",
            self.config.python_path().display()
        ));

        let mut process = match spawn_server(&self.config) {
            Ok(process) => process,
            Err(err) => {
                self.log.append_error(&err.to_string());
                self.fail(err.to_string()).await;
                return Err(err);
            }
        };
        pump_output(&mut process, &self.log);
        let pid = process.pid();
        *self.process.lock().await = Some(process);
        if let Some(pid) = pid {
            self.log.append(&format!("Backend process started (pid {})", pid));
        }

        self.transition(BackendProcessState::Polling).await;
        self.poll_readiness().await
    }

    /// Probe until the backend answers 200, the attempt budget runs out,
    /// or shutdown is requested.
    async fn poll_readiness(&self) -> BackendResult<()> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=self.config.max_poll_attempts {
            if self.shutdown.is_cancelled() {
                return Err(BackendError::internal("startup interrupted by shutdown"));
            }

            if self.client.probe_ready().await {
                if !self.transition(BackendProcessState::Ready).await {
                    return Err(BackendError::internal("startup interrupted by shutdown"));
                }
                self.log.append("Backend is ready!");
                self.notifier.ready();
                return Ok(());
            }

            if attempt < self.config.max_poll_attempts {
                self.log.append(&format!(
                    "Backend not ready, retrying in {}s... (attempt {})",
                    interval.as_secs(),
                    attempt
                ));
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        return Err(BackendError::internal("startup interrupted by shutdown"));
                    }
                    _ = sleep(interval) => {}
                }
            }
        }

        let err = BackendError::ReadinessTimeout {
            attempts: self.config.max_poll_attempts,
        };
        self.log.append_error(&err.to_string());
        self.fail(err.to_string()).await;
        self.notifier.status(err.to_string());
        Err(err)
    }

    /// Watch for the backend exiting on its own after startup.
    ///
    /// Runs until shutdown, the handle disappearing, or the process
    /// exiting, whichever comes first.
    pub fn spawn_exit_monitor(supervisor: Arc<BackendSupervisor>) {
        tokio::spawn(Self::exit_monitor_loop(
            supervisor,
            Duration::from_millis(EXIT_POLL_INTERVAL_MS),
        ));
    }

    async fn exit_monitor_loop(supervisor: Arc<BackendSupervisor>, interval: Duration) {
        loop {
            tokio::select! {
                _ = supervisor.shutdown.cancelled() => break,
                _ = sleep(interval) => {}
            }

            let exited = {
                let mut guard = supervisor.process.lock().await;
                match guard.as_mut() {
                    None => break,
                    Some(process) => match process.try_wait() {
                        Ok(Some(status)) => {
                            guard.take();
                            Some(status)
                        }
                        Ok(None) => None,
                        Err(err) => {
                            supervisor
                                .log
                                .append_error(&format!("Failed to poll backend process: {}", err));
                            None
                        }
                    },
                }
            };

            if let Some(status) = exited {
                supervisor.handle_unexpected_exit(status).await;
                break;
            }
        }
    }

    async fn handle_unexpected_exit(&self, status: ExitStatus) {
        if !status.success() {
            let code = match status.code() {
                Some(code) => code.to_string(),
                None => "unknown".to_string(),
            };
            self.log
                .append_error(&format!("Backend process exited with code {}", code));
        }

        let was_ready = self.state().await.is_ready();
        self.fail("The AI backend stopped unexpectedly.".to_string()).await;
        if was_ready {
            self.notifier.status("The AI backend stopped unexpectedly.");
        }
    }

    /// Shut the backend down. Safe to call any number of times, from any
    /// state, including before `start`.
    pub async fn terminate(&self) {
        self.shutdown.cancel();

        let process = self.process.lock().await.take();
        if let Some(mut process) = process {
            self.log.append("Killing backend process...");
            if let Err(err) = process.kill().await {
                self.log
                    .append_error(&format!("Failed to kill backend process: {}", err));
            }
        }

        let mut state = self.state.write().await;
        *state = BackendProcessState::Terminated;
    }
}

impl std::fmt::Debug for BackendSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSupervisor")
            .field("config", &self.config)
            .finish()
    }
}
