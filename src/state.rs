//! Application State
//!
//! Global state managed by Tauri, containing all services.

use std::sync::Arc;
use tokio::sync::RwLock;

use career_coach_backend::{BackendSupervisor, ConversationStore};

use crate::utils::error::{AppError, AppResult};

/// Application state managed by Tauri
pub struct AppState {
    /// Supervisor owning the single backend server process
    supervisor: Arc<RwLock<Option<Arc<BackendSupervisor>>>>,
    /// In-memory conversation history
    conversation: Arc<ConversationStore>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            supervisor: Arc::new(RwLock::new(None)),
            conversation: Arc::new(ConversationStore::new()),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Install the supervisor built during setup
    pub async fn initialize(&self, supervisor: Arc<BackendSupervisor>) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        {
            let mut supervisor_lock = self.supervisor.write().await;
            *supervisor_lock = Some(supervisor);
        }

        *initialized = true;
        Ok(())
    }

    /// Get the backend supervisor
    pub async fn supervisor(&self) -> AppResult<Arc<BackendSupervisor>> {
        let guard = self.supervisor.read().await;
        match &*guard {
            Some(supervisor) => Ok(Arc::clone(supervisor)),
            None => Err(AppError::internal("Backend supervisor not initialized")),
        }
    }

    /// Get the conversation store
    pub fn conversation(&self) -> Arc<ConversationStore> {
        Arc::clone(&self.conversation)
    }

    /// Check if the backend is ready without blocking
    pub fn is_backend_ready(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.supervisor.try_read() {
            if let Some(ref supervisor) = *guard {
                return supervisor.try_is_ready();
            }
        }
        false
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
