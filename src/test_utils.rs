use crate::config::Settings;
use crate::router::create_router;
use crate::schemas::AppState;
use axum::Router;
use compute::model::Forecaster;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create AppState for testing around the given forecaster
pub fn setup_test_app_state(forecaster: impl Forecaster + Send + Sync + 'static) -> AppState {
    AppState {
        forecaster: Arc::new(forecaster),
        settings: Arc::new(Settings::default()),
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
///
/// # Returns
///
/// A guard that will clean up the subscriber when dropped.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing around the given forecaster
pub fn setup_test_app(forecaster: impl Forecaster + Send + Sync + 'static) -> Router {
    create_router(setup_test_app_state(forecaster))
}

/// Create axum app for testing with a custom upload limit
pub fn setup_test_app_with_limit(
    forecaster: impl Forecaster + Send + Sync + 'static,
    max_upload_bytes: usize,
) -> Router {
    let mut state = setup_test_app_state(forecaster);
    state.settings = Arc::new(Settings {
        max_upload_bytes,
        ..Settings::default()
    });
    create_router(state)
}

/// Create axum app for testing with a custom horizon limit
pub fn setup_test_app_with_horizon(
    forecaster: impl Forecaster + Send + Sync + 'static,
    max_horizon_days: i64,
) -> Router {
    let mut state = setup_test_app_state(forecaster);
    state.settings = Arc::new(Settings {
        max_horizon_days,
        ..Settings::default()
    });
    create_router(state)
}
