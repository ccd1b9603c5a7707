//! Transport types shared by the HTTP handlers and the CLI.
//! They carry the results of a forecast run in a serde friendly shape, so
//! neither surface has to know about polars or the compute types.

mod forecast;

pub use forecast::{AccuracyMetrics, DateRange, ForecastResponse, ForecastRow, UploadSummaryResponse};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}
