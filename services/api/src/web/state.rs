//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use enrollment_core::ports::EnrollmentStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EnrollmentStore>,
    pub config: Arc<Config>,
}
