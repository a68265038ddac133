use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use config::Config;
use infrastructure::Notifier;
use store::{ClickCounter, HourlyRateLimiter};

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod routes;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub rate_limiter: Arc<HourlyRateLimiter>,
    pub clicks: Arc<ClickCounter>,
    pub notifier: Arc<dyn Notifier>,
}

pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(routes::info::info))
        .route("/cat", post(routes::cat::click_cat))
        .route("/poke", post(routes::poke::poke))
        .layer(axum::middleware::from_fn(middleware::log_errors))
        .layer(cors)
        .with_state(state)
}
