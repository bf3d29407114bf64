//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-browser session identifier.

use crate::config::Config;
use diabetes_education_core::ports::{
    DocumentRenderer, PreferenceStore, SummaryGenerationService,
};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Everything request-specific travels through the handlers' own arguments.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summary_adapter: Arc<dyn SummaryGenerationService>,
    pub preference_store: Arc<dyn PreferenceStore>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

//=========================================================================================
// SessionId (Outlives a Single Request)
//=========================================================================================

/// Opaque identifier of one browser session. Assigned on the first request and
/// carried in a cookie for the rest of the session; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
