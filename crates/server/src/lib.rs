pub mod error;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index::page))
        .route("/api/health", get(routes::health::health))
        .route("/api/analyze", post(routes::analyze::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
