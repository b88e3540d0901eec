//! Health Check Commands
//!
//! Commands for checking the health status of the application.

use tauri::State;

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of the application and its backend
#[tauri::command]
pub async fn get_health(state: State<'_, AppState>) -> Result<CommandResponse<HealthResponse>, String> {
    let mut health = HealthResponse::default();

    // Check backend readiness without blocking
    health.backend_ready = state.is_backend_ready();

    // Overall status
    health.status = if health.backend_ready {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    Ok(CommandResponse::ok(health))
}
