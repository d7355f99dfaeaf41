//! REST API serving predictions from the trained model.
//!
//! Provides three endpoints:
//! - `POST /predict` — single-point prediction from a feature vector
//! - `POST /predict_day` — 24-hour forecast from summary inputs
//! - `GET /model_insights` — per-feature importance weights
//!
//! The server starts even when no model artifact could be loaded; every
//! endpoint then answers 503 until a model is trained and the process
//! restarted, so a missing artifact degrades service instead of
//! crash-looping it.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::ValidationMode;
use crate::model::LoadedModel;

/// Immutable application state shared across all request handlers.
///
/// Constructed once before serving begins and wrapped in `Arc` — no
/// locks needed since the model is read-only after load.
pub struct AppState {
    /// The trained model, or `None` when serving in degraded mode.
    pub model: Option<LoadedModel>,
    /// Request input validation mode.
    pub validation: ValidationMode,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/predict_day", post(handlers::predict_day))
        .route("/model_insights", get(handlers::model_insights))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("Prediction API listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
