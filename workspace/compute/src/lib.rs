//! Sales forecasting pipeline: ingestion, normalization, model orchestration,
//! windowing, charting and in-sample accuracy.

pub mod accuracy;
pub mod chart;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod series;
pub mod window;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use model::{AdditiveModel, AdditiveModelConfig, Forecaster};

/// Returns the forecaster used by the service and the CLI.
///
/// It is an additive trend plus seasonality model with its default
/// configuration; no tuning is applied.
pub fn default_forecaster() -> impl Forecaster + Send + Sync + 'static {
    AdditiveModel::new(AdditiveModelConfig::default())
}
