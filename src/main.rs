// Career Coach Desktop - Tauri Application Entry Point
// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use career_coach_desktop::services::startup;
use career_coach_desktop::state::AppState;

use tauri::Manager;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            // Chat commands
            career_coach_desktop::commands::chat::send_message,
            career_coach_desktop::commands::chat::get_conversation,
            // Backend commands
            career_coach_desktop::commands::backend::get_backend_status,
            // Health commands
            career_coach_desktop::commands::health::get_health,
        ])
        .setup(|app| {
            #[cfg(debug_assertions)]
            {
                let window = app.get_webview_window("main").unwrap();
                window.open_devtools();
            }

            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = startup::initialize_app(&handle).await {
                    eprintln!("[ERROR] Failed to initialize application: {}", e);
                    handle.exit(1);
                }
            });
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if let tauri::RunEvent::Exit = event {
            // Same shutdown path however the app exits: kill the backend
            // before the process goes away
            let state = app_handle.state::<AppState>();
            tauri::async_runtime::block_on(async {
                if let Ok(supervisor) = state.supervisor().await {
                    supervisor.terminate().await;
                }
            });
        }
    });
}
