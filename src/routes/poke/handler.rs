use axum::{Json, body::Bytes, extract::State};

use super::model::{PokeRequest, PokeResponse};
use crate::AppState;
use crate::error::AppError;
use crate::routes::run_blocking;

pub const POKE_KEY: &str = "poke";

#[axum::debug_handler]
pub async fn poke(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PokeResponse>, AppError> {
    let (message, author) = PokeRequest::from_body(&body)
        .validate()
        .map_err(AppError::Validation)?;

    let limit = state.config.poke_hourly_limit;
    let limiter = state.rate_limiter.clone();
    let decision = run_blocking(move || limiter.increment_and_check(POKE_KEY, limit)).await??;

    if !decision.allowed {
        return Err(AppError::RateLimited {
            message: "Hourly poke limit reached",
            hourly_count: decision.count,
            hourly_limit: limit,
        });
    }

    state.notifier.send(&format!("{message} - {author}")).await?;
    tracing::info!("Poke from {} delivered", author);

    Ok(Json(PokeResponse {
        status: "ok",
        message: "Poke sent successfully",
        hourly_count: decision.count,
        hourly_limit: limit,
    }))
}
