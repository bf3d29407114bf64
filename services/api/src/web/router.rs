//! services/api/src/web/router.rs
//!
//! Assembles the form's routes, the session middleware and the CORS policy.

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    middleware::assign_session,
    rest::{
        create_summary_handler, export_pdf_handler, form_options_handler, health_handler,
        lifestyle_scores_handler, preference_tally_handler, reference_handler,
        save_preference_handler,
    },
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Form payloads are small; the limit only has to fit a long summary sent back for PDF export.
const BODY_LIMIT_BYTES: usize = 256 * 1024;

/// Builds the API router with all middleware applied.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/form/options", get(form_options_handler))
        .route("/reference", get(reference_handler))
        .route("/lifestyle/scores", post(lifestyle_scores_handler))
        .route("/summaries", post(create_summary_handler))
        .route("/summaries/pdf", post(export_pdf_handler))
        .route("/preferences", post(save_preference_handler))
        .route("/preferences/tally", get(preference_tally_handler))
        .layer(axum_middleware::from_fn(assign_session))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
