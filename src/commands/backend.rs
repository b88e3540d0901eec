//! Backend Commands
//!
//! Tauri commands for inspecting the supervised backend process. The
//! webview uses these to recover state after a reload, since events fired
//! before its listeners attached are gone.

use tauri::State;

use career_coach_backend::BackendStatus;

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Get the current backend lifecycle status
#[tauri::command]
pub async fn get_backend_status(
    state: State<'_, AppState>,
) -> Result<CommandResponse<BackendStatus>, String> {
    match state.supervisor().await {
        Ok(supervisor) => Ok(CommandResponse::ok(supervisor.status().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
