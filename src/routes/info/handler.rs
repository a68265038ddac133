use std::collections::BTreeMap;

use axum::{Json, extract::State};

use super::model::{EndpointLimit, InfoResponse};
use crate::AppState;
use crate::error::AppError;
use crate::routes::{cat::CAT_KEY, poke::POKE_KEY, run_blocking};

#[axum::debug_handler]
pub async fn info(State(state): State<AppState>) -> Result<Json<InfoResponse>, AppError> {
    let limiter = state.rate_limiter.clone();
    let clicks = state.clicks.clone();
    let (cat_count, poke_count, cat_clicks) = run_blocking(move || {
        (
            limiter.get_count(CAT_KEY),
            limiter.get_count(POKE_KEY),
            clicks.current(),
        )
    })
    .await?;

    let mut limits = BTreeMap::new();
    limits.insert(
        CAT_KEY,
        EndpointLimit {
            hourly_count: cat_count,
            hourly_limit: state.config.cat_hourly_limit,
        },
    );
    limits.insert(
        POKE_KEY,
        EndpointLimit {
            hourly_count: poke_count,
            hourly_limit: state.config.poke_hourly_limit,
        },
    );

    Ok(Json(InfoResponse {
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
        timestamp: chrono::Utc::now(),
        cat_clicks,
        limits,
    }))
}
