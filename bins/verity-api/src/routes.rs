use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/challenges", get(handlers::list_challenges))
        .route("/challenges/:slug", get(handlers::get_challenge))
        .route("/challenges/:slug/run", post(handlers::run_challenge))
        .route("/challenges/:slug/submit", post(handlers::submit_challenge))
}
