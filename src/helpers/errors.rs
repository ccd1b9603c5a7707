use axum::{http::StatusCode, response::Json};
use compute::error::ComputeError;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a fatal pipeline error to its HTTP status and error body.
pub fn compute_error_response(e: &ComputeError) -> ApiError {
    let status = match e {
        ComputeError::Schema { .. }
        | ComputeError::DateParse { .. }
        | ComputeError::EmptyDataset
        | ComputeError::Forecasting(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ComputeError::MalformedUpload(_) | ComputeError::InvalidWindow(_) => StatusCode::BAD_REQUEST,
        ComputeError::DataFrame(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Forecast request failed: {}", e);
    } else {
        warn!("Forecast request rejected ({}): {}", e.code(), e);
    }

    (status, Json(ErrorResponse::new(e.to_string(), e.code())))
}

pub fn internal_error_response(message: impl Into<String>) -> ApiError {
    let message = message.into();
    error!("Internal error: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message, "INTERNAL_ERROR")),
    )
}
