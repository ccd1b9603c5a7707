//! Stub forecasters and fixtures shared by the unit tests and the HTTP tests.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ComputeError, Result};
use crate::model::{FittedModel, ForecastPoint, Forecaster};
use crate::series::{CanonicalSeries, SeriesPoint};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// `[(2024-01-01, 100), (2024-01-02, 110), (2024-01-03, 105)]`
pub fn three_day_series() -> CanonicalSeries {
    CanonicalSeries::from_points(vec![
        SeriesPoint::new(date(2024, 1, 1), 100.0),
        SeriesPoint::new(date(2024, 1, 2), 110.0),
        SeriesPoint::new(date(2024, 1, 3), 105.0),
    ])
}

/// The same three days as an upload, with day-first dates.
pub const THREE_DAY_CSV: &str = "Date,Sales\n01/01/2024,100\n02/01/2024,110\n03/01/2024,105\n";

/// Predicts the historical value on historical dates and the last value
/// afterwards, with a fixed margin.
#[derive(Debug, Clone)]
pub struct EchoForecaster {
    pub margin: f64,
}

impl Default for EchoForecaster {
    fn default() -> Self {
        Self { margin: 5.0 }
    }
}

struct EchoFitted {
    values: HashMap<NaiveDate, f64>,
    last: f64,
    margin: f64,
}

impl Forecaster for EchoForecaster {
    fn name(&self) -> &str {
        "echo"
    }

    fn fit(&self, series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        let last = series
            .points()
            .last()
            .map(|p| p.value)
            .ok_or_else(|| ComputeError::Forecasting("empty series".to_string()))?;
        Ok(Box::new(EchoFitted {
            values: series.points().iter().map(|p| (p.timestamp, p.value)).collect(),
            last,
            margin: self.margin,
        }))
    }
}

impl FittedModel for EchoFitted {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(dates
            .iter()
            .map(|d| {
                let value = self.values.get(d).copied().unwrap_or(self.last);
                ForecastPoint::new(*d, value, value - self.margin, value + self.margin)
            })
            .collect())
    }
}

/// Records how often it was fitted and which dates it was asked for.
/// Predicts a constant `100 ± 10`.
#[derive(Debug, Clone, Default)]
pub struct RecordingForecaster {
    fit_calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<NaiveDate>>>,
}

impl RecordingForecaster {
    pub fn fit_calls(&self) -> usize {
        self.fit_calls.load(Ordering::SeqCst)
    }

    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.requested.lock().unwrap().clone()
    }
}

struct RecordingFitted {
    requested: Arc<Mutex<Vec<NaiveDate>>>,
}

impl Forecaster for RecordingForecaster {
    fn name(&self) -> &str {
        "recording"
    }

    fn fit(&self, _series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        self.fit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingFitted {
            requested: Arc::clone(&self.requested),
        }))
    }
}

impl FittedModel for RecordingFitted {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        self.requested.lock().unwrap().extend_from_slice(dates);
        Ok(dates
            .iter()
            .map(|d| ForecastPoint::new(*d, 100.0, 90.0, 110.0))
            .collect())
    }
}

/// Always fails to fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingForecaster;

impl Forecaster for FailingForecaster {
    fn name(&self) -> &str {
        "failing"
    }

    fn fit(&self, _series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        Err(ComputeError::Forecasting("degenerate data".to_string()))
    }
}

/// Returns a lower bound above the point estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnorderedForecaster;

struct UnorderedFitted;

impl Forecaster for UnorderedForecaster {
    fn name(&self) -> &str {
        "unordered"
    }

    fn fit(&self, _series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        Ok(Box::new(UnorderedFitted))
    }
}

impl FittedModel for UnorderedFitted {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(dates
            .iter()
            .map(|d| ForecastPoint::new(*d, 100.0, 120.0, 130.0))
            .collect())
    }
}

/// Returns every point one day later than requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftedForecaster;

struct ShiftedFitted;

impl Forecaster for ShiftedForecaster {
    fn name(&self) -> &str {
        "shifted"
    }

    fn fit(&self, _series: &CanonicalSeries) -> Result<Box<dyn FittedModel>> {
        Ok(Box::new(ShiftedFitted))
    }
}

impl FittedModel for ShiftedFitted {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(dates
            .iter()
            .map(|d| ForecastPoint::new(*d + Duration::days(1), 100.0, 90.0, 110.0))
            .collect())
    }
}
