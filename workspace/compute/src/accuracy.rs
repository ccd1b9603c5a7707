//! In-sample accuracy of a forecast.
//!
//! The metrics compare the model's predictions on the historical dates with
//! the values it was trained on. They say how well the model reproduces its
//! training data, nothing about how well it generalizes.

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::ForecastPoint;
use crate::series::CanonicalSeries;

/// Root mean squared error and mean absolute error over the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyReport {
    pub rmse: f64,
    pub mae: f64,
}

/// Reasons the metrics cannot be computed. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccuracyUnavailable {
    #[error("there is no history to compare against")]
    EmptyHistory,

    #[error("no prediction exists for historical date {date}")]
    MissingPrediction { date: NaiveDate },

    #[error("historical value for {date} is missing or not a number")]
    NonFiniteActual { date: NaiveDate },

    #[error("error metrics are not finite")]
    NonFiniteMetric,
}

/// Scores the full forecast against every historical observation.
///
/// `forecast` must be the unfiltered model output, since the window shown to
/// the user never overlaps the history.
#[instrument(skip(history, forecast), fields(history = history.len(), forecast = forecast.len()))]
pub fn evaluate_accuracy(
    history: &CanonicalSeries,
    forecast: &[ForecastPoint],
) -> Result<AccuracyReport, AccuracyUnavailable> {
    if history.is_empty() {
        return Err(AccuracyUnavailable::EmptyHistory);
    }

    let predicted: HashMap<NaiveDate, f64> = forecast
        .iter()
        .map(|p| (p.timestamp, p.point_estimate))
        .collect();

    let mut squared = 0.0;
    let mut absolute = 0.0;
    for point in history.points() {
        if !point.value.is_finite() {
            return Err(AccuracyUnavailable::NonFiniteActual {
                date: point.timestamp,
            });
        }
        let estimate = predicted
            .get(&point.timestamp)
            .copied()
            .ok_or(AccuracyUnavailable::MissingPrediction {
                date: point.timestamp,
            })?;
        let error = point.value - estimate;
        squared += error * error;
        absolute += error.abs();
    }

    let n = history.len() as f64;
    let report = AccuracyReport {
        rmse: (squared / n).sqrt(),
        mae: absolute / n,
    };
    if !report.rmse.is_finite() || !report.mae.is_finite() {
        return Err(AccuracyUnavailable::NonFiniteMetric);
    }

    debug!("In-sample RMSE {:.4}, MAE {:.4}", report.rmse, report.mae);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::run_forecast;
    use crate::series::SeriesPoint;
    use crate::testing::{date, three_day_series, EchoForecaster, RecordingForecaster};

    #[test]
    fn test_perfect_predictions_score_zero() {
        let series = three_day_series();
        let forecast = run_forecast(&EchoForecaster::default(), &series, date(2024, 1, 6)).unwrap();

        let report = evaluate_accuracy(&series, &forecast).unwrap();
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mae, 0.0);
    }

    #[test]
    fn test_metrics_against_constant_prediction() {
        // constant 100 against 100, 110, 105
        let series = three_day_series();
        let forecast = run_forecast(&RecordingForecaster::default(), &series, date(2024, 1, 3)).unwrap();

        let report = evaluate_accuracy(&series, &forecast).unwrap();
        assert!((report.mae - 5.0).abs() < 1e-12);
        assert!((report.rmse - (125.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_dates_are_scored_individually() {
        let series = CanonicalSeries::from_points(vec![
            SeriesPoint::new(date(2024, 1, 1), 90.0),
            SeriesPoint::new(date(2024, 1, 1), 110.0),
        ]);
        let forecast = vec![ForecastPoint::new(date(2024, 1, 1), 100.0, 90.0, 110.0)];

        let report = evaluate_accuracy(&series, &forecast).unwrap();
        assert_eq!(report.mae, 10.0);
        assert_eq!(report.rmse, 10.0);
    }

    #[test]
    fn test_missing_prediction_is_unavailable() {
        let series = three_day_series();
        let forecast = vec![
            ForecastPoint::new(date(2024, 1, 1), 100.0, 90.0, 110.0),
            ForecastPoint::new(date(2024, 1, 3), 100.0, 90.0, 110.0),
        ];

        assert_eq!(
            evaluate_accuracy(&series, &forecast),
            Err(AccuracyUnavailable::MissingPrediction {
                date: date(2024, 1, 2)
            })
        );
    }

    #[test]
    fn test_empty_history_is_unavailable() {
        assert_eq!(
            evaluate_accuracy(&CanonicalSeries::default(), &[]),
            Err(AccuracyUnavailable::EmptyHistory)
        );
    }

    #[test]
    fn test_non_finite_actual_is_unavailable() {
        let series = CanonicalSeries::from_points(vec![SeriesPoint::new(date(2024, 1, 1), f64::NAN)]);
        let forecast = vec![ForecastPoint::new(date(2024, 1, 1), 100.0, 90.0, 110.0)];
        assert!(matches!(
            evaluate_accuracy(&series, &forecast),
            Err(AccuracyUnavailable::NonFiniteActual { .. })
        ));
    }

    #[test]
    fn test_non_finite_metric_is_unavailable() {
        let series = CanonicalSeries::from_points(vec![SeriesPoint::new(date(2024, 1, 1), f64::MAX)]);
        let forecast = vec![ForecastPoint::new(date(2024, 1, 1), -f64::MAX, -f64::MAX, -f64::MAX)];
        assert_eq!(
            evaluate_accuracy(&series, &forecast),
            Err(AccuracyUnavailable::NonFiniteMetric)
        );
    }
}
