pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::scheduling::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/sessions/plan",
            post(handlers::handle_plan_session),
        )
        .with_state(state)
}
