use chrono::NaiveDate;
use common::{AccuracyMetrics, DateRange, ForecastResponse, ForecastRow, UploadSummaryResponse};
use compute::model::Forecaster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::{Validate, ValidationError};

use crate::config::Settings;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Model used for every forecast request; each request fits its own instance
    pub forecaster: Arc<dyn Forecaster + Send + Sync>,
    /// Runtime settings
    pub settings: Arc<Settings>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("forecaster", &self.forecaster.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Query parameters selecting the display window of a forecast
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
#[validate(schema(function = "validate_window_order"))]
pub struct ForecastQuery {
    /// First day shown (YYYY-MM-DD), defaults to the day after the history
    pub start_date: Option<NaiveDate>,
    /// Last day shown (YYYY-MM-DD), defaults to 90 days after the history
    pub end_date: Option<NaiveDate>,
}

fn validate_window_order(query: &ForecastQuery) -> Result<(), ValidationError> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut error = ValidationError::new("window_order");
            error.message = Some("end_date must not be before start_date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Name of the forecasting model in use
    pub model: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::forecast::upload_dataset,
        crate::handlers::forecast::run_forecast,
        crate::handlers::forecast::render_forecast_chart,
    ),
    components(
        schemas(
            ApiResponse<UploadSummaryResponse>,
            ApiResponse<ForecastResponse>,
            ErrorResponse,
            HealthResponse,
            ForecastQuery,
            UploadSummaryResponse,
            ForecastResponse,
            ForecastRow,
            AccuracyMetrics,
            DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "forecast", description = "Sales upload and forecasting endpoints"),
    ),
    info(
        title = "Salescast API",
        description = "Sales forecasting service: upload a Date/Sales history and get a forecast table, chart and in-sample accuracy",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
