//! Application Startup
//!
//! Builds the backend supervisor during Tauri setup and launches the
//! backend in the background. Failure policy: provisioning and spawn
//! errors are fatal (blocking dialog, then exit); a readiness timeout
//! shows a dialog but leaves the application running so the user can
//! read the log and retry queries later.

use std::sync::Arc;

use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use career_coach_backend::{
    BackendConfig, BackendError, BackendSupervisor, LogSink, StartupNotifier,
};

use crate::services::events::{spawn_notice_forwarder, AppEventEmitter};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::paths;

/// Build the supervisor, wire the loading-surface events, and kick off
/// backend startup. Called once from Tauri setup.
pub async fn initialize_app<R: Runtime>(app: &AppHandle<R>) -> AppResult<()> {
    paths::ensure_career_coach_dir()?;
    let log = Arc::new(open_log_sink());

    let mut config = BackendConfig::load_or_init(&paths::config_path()?)?;
    config.backend_dir = paths::resolve_backend_dir(&config.backend_dir);

    let (notifier, notices) = StartupNotifier::channel();
    spawn_notice_forwarder(AppEventEmitter::new(app.clone()), notices);

    let supervisor = Arc::new(BackendSupervisor::new(config, Arc::clone(&log), notifier));
    let state = app.state::<AppState>();
    state.initialize(Arc::clone(&supervisor)).await?;

    log.append("App is ready. Starting backend and creating window...");
    spawn_backend_startup(app.clone(), supervisor);
    Ok(())
}

/// Open the application log, falling back to console-only on failure.
fn open_log_sink() -> LogSink {
    let path = match paths::log_path() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("[WARN] Could not resolve log path: {}", err);
            return LogSink::disabled();
        }
    };
    match LogSink::open(&path) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("[WARN] Could not open log file {}: {}", path.display(), err);
            LogSink::disabled()
        }
    }
}

/// Run backend startup in the background and apply the dialog policy.
fn spawn_backend_startup<R: Runtime>(app: AppHandle<R>, supervisor: Arc<BackendSupervisor>) {
    tokio::spawn(async move {
        match supervisor.start().await {
            Ok(()) => {
                BackendSupervisor::spawn_exit_monitor(supervisor);
            }
            Err(err) if err.is_fatal() => {
                // Unrecoverable: without a backend process there is nothing
                // for the app to talk to
                show_blocking_error(&app, "Backend Error", &err.to_string());
                app.exit(1);
            }
            Err(err @ BackendError::ReadinessTimeout { .. }) => {
                show_error(&app, "Backend Startup Error", &err.to_string());
            }
            Err(err) => {
                tracing::error!("backend startup did not complete: {}", err);
            }
        }
    });
}

/// Show an error dialog and wait for the user to dismiss it.
fn show_blocking_error<R: Runtime>(app: &AppHandle<R>, title: &str, message: &str) {
    app.dialog()
        .message(message)
        .title(title)
        .kind(MessageDialogKind::Error)
        .blocking_show();
}

/// Show an error dialog without waiting.
fn show_error<R: Runtime>(app: &AppHandle<R>, title: &str, message: &str) {
    app.dialog()
        .message(message)
        .title(title)
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}
