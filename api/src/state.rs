//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use engine::{EngineConfig, LogEngine};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<LogEngine>,
}

impl AppState {
    /// Creates a new application state wrapping the given engine.
    #[must_use]
    pub fn new(engine: Arc<LogEngine>) -> Self {
        Self { engine }
    }

    /// Creates a state with an engine rooted at the given archive tree.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_data_root(data_root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(LogEngine::new(EngineConfig::new(data_root))))
    }

    /// Returns the shared engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<LogEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::models::LogFilter;

    #[test]
    fn test_state_is_clone_and_shares_engine() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::with_data_root(dir.path());
        let state2 = state.clone();

        assert!(Arc::ptr_eq(state.engine(), state2.engine()));
        assert!(state.engine().filter(&LogFilter::new()).is_empty());
    }
}
