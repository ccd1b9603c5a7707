use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DateRange {
    /// First day (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last day (YYYY-MM-DD)
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }
}

/// Confirmation of an upload with its historical range.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UploadSummaryResponse {
    /// Number of data rows read
    pub rows: usize,
    /// First and last historical date
    pub historical_range: DateRange,
    /// Window used when the forecast request names no dates
    pub default_window: DateRange,
}

/// One row of the forecast table, labelled for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Predicted Sales")]
    pub predicted_sales: f64,
    #[serde(rename = "Lower Estimate")]
    pub lower_estimate: f64,
    #[serde(rename = "Upper Estimate")]
    pub upper_estimate: f64,
}

/// In-sample accuracy of the model.
///
/// `available` is false when the metrics could not be computed; `message`
/// then carries the reason. Values are kept unrounded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AccuracyMetrics {
    pub available: bool,
    /// Root mean squared error
    pub rmse: Option<f64>,
    /// Mean absolute error
    pub mae: Option<f64>,
    pub message: String,
}

impl AccuracyMetrics {
    pub fn available(rmse: f64, mae: f64) -> Self {
        Self {
            available: true,
            rmse: Some(rmse),
            mae: Some(mae),
            message: format!("RMSE: {:.2}, MAE: {:.2}", rmse, mae),
        }
    }

    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            available: false,
            rmse: None,
            mae: None,
            message: format!("Could not compute accuracy metrics: {}", reason),
        }
    }
}

/// Result of one forecast request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastResponse {
    /// Range covered by the uploaded history
    pub historical_range: DateRange,
    /// Display window the rows are restricted to
    pub window: DateRange,
    /// Forecast rows inside the window, ascending by date
    pub rows: Vec<ForecastRow>,
    pub accuracy: AccuracyMetrics,
}
