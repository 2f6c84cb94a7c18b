//! disc-at library - DISC Assessment Test service
//!
//! Issues test links, runs the questionnaire lifecycle, commits
//! submissions atomically and serves results over JSON/HTTP.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod workflow;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let tests = Router::new()
        .route("/api/links", post(api::create_link))
        .route("/api/tests/:token/start", post(api::start_test))
        .route("/api/tests/:token/submit", post(api::submit_test))
        .route("/api/tests/:token/score", get(api::get_score))
        .route("/api/tests/:token/progress", get(api::get_progress))
        .route("/api/tests/:token/result", get(api::get_result))
        .route("/api/tests/:token/answers", get(api::get_answers));

    Router::new()
        .merge(tests)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
