//! Environment Provisioning
//!
//! First-launch setup of the backend's isolated Python environment: create
//! a venv inside the backend directory, install the pinned dependencies
//! from the requirements manifest, then stamp a marker file. Later
//! launches see the marker plus the venv interpreter and skip the whole
//! step, so the multi-minute install cost is paid once.

use chrono::{SecondsFormat, Utc};
use tokio::process::Command;

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::logging::LogSink;
use crate::notify::StartupNotifier;

/// Interpreter used to create the venv (the venv's own interpreter runs
/// everything after that).
pub fn system_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Whether provisioning has already completed on a previous launch.
///
/// Both halves must be present: the marker alone is not trusted if the
/// venv interpreter has been deleted out from under it.
pub fn is_provisioned(config: &BackendConfig) -> bool {
    config.python_path().exists() && config.marker_path().exists()
}

/// Run one provisioning command to completion, logging its output.
///
/// `step` is a human-readable verb phrase used in log lines and error
/// messages, e.g. "create the Python virtual environment".
async fn run_step(mut command: Command, step: &str, log: &LogSink) -> BackendResult<()> {
    let output = match command.output().await {
        Ok(output) => output,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(BackendError::provisioning(format!(
                "Python runtime not found while trying to {}",
                step
            )));
        }
        Err(err) => {
            return Err(BackendError::provisioning(format!(
                "Failed to {}: {}",
                step, err
            )));
        }
    };

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        if !line.trim().is_empty() {
            log.append(line);
        }
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        if !line.trim().is_empty() {
            log.append_error(line);
        }
    }

    if !output.status.success() {
        return Err(BackendError::provisioning(format!(
            "Failed to {} ({})",
            step, output.status
        )));
    }
    Ok(())
}

/// Provision the backend's Python environment, or skip if already done.
///
/// Progress is reported through `notifier` so the loading surface can show
/// what the long-running steps are doing. Any failure here is fatal to
/// startup; nothing is retried.
pub async fn provision_environment(
    config: &BackendConfig,
    log: &LogSink,
    notifier: &StartupNotifier,
) -> BackendResult<()> {
    if !config.backend_dir.exists() {
        return Err(BackendError::provisioning(format!(
            "Backend directory not found at: {}",
            config.backend_dir.display()
        )));
    }

    if is_provisioned(config) {
        log.append("Python environment already provisioned, skipping setup");
        return Ok(());
    }

    if !config.python_path().exists() {
        notifier.status("Preparing Python environment...");
        log.append(&format!(
            "Creating virtual environment in {}",
            config.venv_dir().display()
        ));
        let mut command = Command::new(system_python());
        command.args(["-m", "venv", "venv"]).current_dir(&config.backend_dir);
        run_step(command, "create the Python virtual environment", log).await?;
    }

    let manifest = config.manifest_path();
    if !manifest.exists() {
        return Err(BackendError::provisioning(format!(
            "Requirements file not found at: {}",
            manifest.display()
        )));
    }

    notifier.status("Installing required packages...");
    log.append(&format!(
        "Installing Python dependencies from {}",
        config.requirements_file
    ));
    let mut command = Command::new(config.python_path());
    command
        .args(["-m", "pip", "install", "-r", &config.requirements_file])
        .current_dir(&config.backend_dir);
    run_step(command, "install Python dependencies", log).await?;

    // Written only after a clean install; losing it just means one
    // redundant re-install on the next launch.
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if let Err(err) = tokio::fs::write(config.marker_path(), format!("{}\n", stamp)).await {
        log.append_error(&format!("Could not write provisioning marker: {}", err));
    } else {
        log.append("Python environment provisioned");
    }

    Ok(())
}
