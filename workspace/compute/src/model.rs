pub mod additive;
mod linalg;

use chrono::NaiveDate;

use crate::error::Result;
use crate::series::CanonicalSeries;

pub use additive::{AdditiveModel, AdditiveModelConfig};

/// One predicted day with its uncertainty interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    pub fn new(timestamp: NaiveDate, point_estimate: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            timestamp,
            point_estimate,
            lower_bound,
            upper_bound,
        }
    }

    /// Returns true when `lower_bound <= point_estimate <= upper_bound`.
    pub fn is_ordered(&self) -> bool {
        self.lower_bound <= self.point_estimate && self.point_estimate <= self.upper_bound
    }
}

/// A forecasting model that can be trained on a canonical series.
///
/// Every call to [`Forecaster::fit`] must start from a fresh model; nothing
/// learned from one series may leak into the next fit.
pub trait Forecaster {
    /// Short name reported by the health endpoint and logs.
    fn name(&self) -> &str;

    /// Fits a new model on the whole series.
    fn fit(&self, series: &CanonicalSeries) -> Result<Box<dyn FittedModel>>;
}

/// A trained model ready to predict.
pub trait FittedModel {
    /// Predicts one point per requested date, in request order.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>>;
}
