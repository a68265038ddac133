use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::infrastructure::NotifyError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{message}")]
    RateLimited {
        message: &'static str,
        hourly_count: u64,
        hourly_limit: i64,
    },

    #[error("Failed to send notification")]
    Notification(#[from] NotifyError),

    #[error("Failed to update counter")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hourly_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hourly_limit: Option<i64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, hourly_count, hourly_limit) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, None, None),
            AppError::RateLimited {
                hourly_count,
                hourly_limit,
                ..
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                Some(*hourly_count),
                Some(*hourly_limit),
            ),
            AppError::Notification(e) => {
                tracing::error!("Notification failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None, None)
            }
            AppError::Store(e) => {
                tracing::error!("Store write failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None, None)
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
        };

        let body = Json(ErrorResponse {
            status: "error",
            message: self.to_string(),
            hourly_count,
            hourly_limit,
        });

        (status, body).into_response()
    }
}
