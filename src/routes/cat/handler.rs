use axum::{Json, extract::State};

use super::model::CatResponse;
use crate::AppState;
use crate::error::AppError;
use crate::routes::run_blocking;

pub const CAT_KEY: &str = "cat";

#[axum::debug_handler]
pub async fn click_cat(State(state): State<AppState>) -> Result<Json<CatResponse>, AppError> {
    let limit = state.config.cat_hourly_limit;
    let limiter = state.rate_limiter.clone();
    let decision = run_blocking(move || limiter.increment_and_check(CAT_KEY, limit)).await??;

    if !decision.allowed {
        return Err(AppError::RateLimited {
            message: "Hourly cat limit reached",
            hourly_count: decision.count,
            hourly_limit: limit,
        });
    }

    let clicks = state.clicks.clone();
    let count = run_blocking(move || clicks.increment()).await??;
    tracing::debug!("Cat clicked, total {}", count);

    Ok(Json(CatResponse {
        status: "ok",
        count,
        hourly_count: decision.count,
        hourly_limit: limit,
    }))
}
