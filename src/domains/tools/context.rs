//! Shared state handed to every tool call.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::Config;
use crate::domains::sessions::SessionStore;

use super::coordinator::ToolInvocationCoordinator;

/// Configuration and session coordinator shared by all tools.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub coordinator: ToolInvocationCoordinator,
}

impl ToolContext {
    /// Build a context with a fresh session store sized from `config`.
    pub fn new(config: Arc<Config>) -> Self {
        let store = match config.sessions.idle_timeout_secs {
            Some(secs) => SessionStore::with_idle_timeout(Duration::from_secs(secs)),
            None => SessionStore::new(),
        };

        Self {
            config,
            coordinator: ToolInvocationCoordinator::new(Arc::new(store)),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.coordinator.store()
    }
}
