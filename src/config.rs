use anyhow::Result;
use compute::window::DEFAULT_MAX_HORIZON_DAYS;
use config::{Config, Environment};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Runtime settings, read from `SALESCAST_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Longest forecast horizon in days, from the first historical date
    /// through the window end
    pub max_horizon_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_horizon_days: DEFAULT_MAX_HORIZON_DAYS,
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then overlays the environment on the defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::with_prefix("SALESCAST").try_parsing(true))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .set_default("max_horizon_days", DEFAULT_MAX_HORIZON_DAYS)?
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

/// Initialize application state with the default forecaster
pub fn initialize_app_state(settings: Settings) -> AppState {
    let forecaster = compute::default_forecaster();
    info!("Using forecasting model: {}", compute::model::Forecaster::name(&forecaster));
    AppState {
        forecaster: Arc::new(forecaster),
        settings: Arc::new(settings),
    }
}
