//! Router construction.
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with permissive CORS for browser clients.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/new-scenario", get(handlers::new_scenario))
        .route("/new-game", post(handlers::new_game))
        .route("/turn", post(handlers::turn))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
