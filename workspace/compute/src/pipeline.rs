//! Request-scoped composition of the forecasting stages.
//!
//! upload bytes → records → canonical series → full forecast → window
//! → {table, chart, accuracy}. Nothing here outlives the call that built it.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{info, instrument, warn};

use crate::accuracy::{evaluate_accuracy, AccuracyReport, AccuracyUnavailable};
use crate::chart::render_chart;
use crate::error::{ComputeError, Result};
use crate::forecast::run_forecast;
use crate::ingest::read_records;
use crate::model::{ForecastPoint, Forecaster};
use crate::series::{normalize, CanonicalSeries};
use crate::window::{days_after, filter_window, format_window, DisplayWindow, DEFAULT_WINDOW_DAYS};

/// Ingests and normalizes an upload.
#[instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn load_series(bytes: &[u8]) -> Result<CanonicalSeries> {
    let records = read_records(bytes)?;
    normalize(&records)
}

/// Status reported back once an upload has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl UploadSummary {
    pub fn from_series(series: &CanonicalSeries) -> Result<Self> {
        let (first_date, last_date) = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ComputeError::EmptyDataset),
        };
        Ok(Self {
            rows: series.len(),
            first_date,
            last_date,
            default_start: days_after(last_date, 1)?,
            default_end: days_after(last_date, DEFAULT_WINDOW_DAYS)?,
        })
    }
}

/// Everything produced by one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub history: CanonicalSeries,
    pub window: DisplayWindow,
    /// Model output from the first historical date through the window end.
    pub full_forecast: Vec<ForecastPoint>,
    /// The part of `full_forecast` inside the window.
    pub window_forecast: Vec<ForecastPoint>,
    pub accuracy: std::result::Result<AccuracyReport, AccuracyUnavailable>,
}

impl ForecastRun {
    /// Display table with presentation labels.
    pub fn table(&self) -> Result<DataFrame> {
        format_window(&self.full_forecast, &self.window)
    }

    pub fn chart_html(&self) -> String {
        render_chart(&self.history, &self.window_forecast)
    }
}

/// Runs the forecast for one request.
///
/// Fatal errors abort the run. Accuracy problems are kept in the result and
/// only logged.
#[instrument(skip(forecaster, series), fields(model = forecaster.name(), start = %window.start_date(), end = %window.end_date()))]
pub fn run_pipeline(
    forecaster: &dyn Forecaster,
    series: CanonicalSeries,
    window: DisplayWindow,
) -> Result<ForecastRun> {
    let full_forecast = run_forecast(forecaster, &series, window.end_date())?;
    let window_forecast = filter_window(&full_forecast, &window);

    let accuracy = evaluate_accuracy(&series, &full_forecast);
    match &accuracy {
        Ok(report) => info!("In-sample RMSE {:.2}, MAE {:.2}", report.rmse, report.mae),
        Err(reason) => warn!("Could not compute accuracy metrics: {}", reason),
    }

    Ok(ForecastRun {
        history: series,
        window,
        full_forecast,
        window_forecast,
        accuracy,
    })
}
