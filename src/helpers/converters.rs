use common::{AccuracyMetrics, DateRange, ForecastResponse, ForecastRow, UploadSummaryResponse};
use compute::accuracy::{AccuracyReport, AccuracyUnavailable};
use compute::error::{ComputeError, Result};
use compute::model::ForecastPoint;
use compute::pipeline::{ForecastRun, UploadSummary};

/// Converts forecast points into display-labelled transport rows.
pub fn convert_points_to_rows(points: &[ForecastPoint]) -> Vec<ForecastRow> {
    points
        .iter()
        .map(|p| ForecastRow {
            date: p.timestamp,
            predicted_sales: p.point_estimate,
            lower_estimate: p.lower_bound,
            upper_estimate: p.upper_bound,
        })
        .collect()
}

pub fn convert_accuracy(
    accuracy: &std::result::Result<AccuracyReport, AccuracyUnavailable>,
) -> AccuracyMetrics {
    match accuracy {
        Ok(report) => AccuracyMetrics::available(report.rmse, report.mae),
        Err(reason) => AccuracyMetrics::unavailable(reason),
    }
}

pub fn convert_upload_summary(summary: &UploadSummary) -> UploadSummaryResponse {
    UploadSummaryResponse {
        rows: summary.rows,
        historical_range: DateRange::new(summary.first_date, summary.last_date),
        default_window: DateRange::new(summary.default_start, summary.default_end),
    }
}

/// Builds the response of a forecast request from a finished run.
pub fn convert_forecast_run(run: &ForecastRun) -> Result<ForecastResponse> {
    let (first, last) = match (run.history.first_date(), run.history.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ComputeError::EmptyDataset),
    };

    Ok(ForecastResponse {
        historical_range: DateRange::new(first, last),
        window: DateRange::new(run.window.start_date(), run.window.end_date()),
        rows: convert_points_to_rows(&run.window_forecast),
        accuracy: convert_accuracy(&run.accuracy),
    })
}
