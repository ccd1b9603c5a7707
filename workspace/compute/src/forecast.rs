use chrono::NaiveDate;
use tracing::{debug, error, info, instrument};

use crate::error::{ComputeError, Result};
use crate::model::{ForecastPoint, Forecaster};
use crate::series::CanonicalSeries;

/// Every calendar day from the first historical date through `end_date`.
///
/// The horizon always starts at the beginning of the history so the model
/// output lines up with every observed date.
pub fn forecast_horizon(series: &CanonicalSeries, end_date: NaiveDate) -> Vec<NaiveDate> {
    match series.first_date() {
        Some(first) => first.iter_days().take_while(|d| *d <= end_date).collect(),
        None => Vec::new(),
    }
}

/// Fits a fresh model on the whole series and predicts the full horizon.
///
/// The model output is checked against the contract: one point per requested
/// date, in request order, with ordered bounds.
#[instrument(skip(forecaster, series), fields(model = forecaster.name(), points = series.len()))]
pub fn run_forecast(
    forecaster: &dyn Forecaster,
    series: &CanonicalSeries,
    end_date: NaiveDate,
) -> Result<Vec<ForecastPoint>> {
    if series.is_empty() {
        return Err(ComputeError::Forecasting(
            "Cannot fit a model on an empty series".to_string(),
        ));
    }

    let horizon = forecast_horizon(series, end_date);
    info!(
        "Forecasting {} days from {:?} to {}",
        horizon.len(),
        series.first_date(),
        end_date
    );

    let fitted = forecaster.fit(series).inspect_err(|e| {
        error!("Model fit failed: {}", e);
    })?;
    let points = fitted.predict(&horizon).inspect_err(|e| {
        error!("Model prediction failed: {}", e);
    })?;

    if points.len() != horizon.len() {
        return Err(ComputeError::Forecasting(format!(
            "Model returned {} points for {} requested dates",
            points.len(),
            horizon.len()
        )));
    }
    for (point, date) in points.iter().zip(&horizon) {
        if point.timestamp != *date {
            return Err(ComputeError::Forecasting(format!(
                "Model returned a point for {} where {} was requested",
                point.timestamp, date
            )));
        }
        if !point.is_ordered() {
            return Err(ComputeError::Forecasting(format!(
                "Model bounds for {} are not ordered: {} <= {} <= {}",
                point.timestamp, point.lower_bound, point.point_estimate, point.upper_bound
            )));
        }
    }

    debug!("Forecast produced {} points", points.len());
    Ok(points)
}
