use thiserror::Error;
use tracing::error;

/// Error types for the compute module.
///
/// Every variant is fatal to a forecast run. Accuracy problems are not part of
/// this taxonomy, see [`crate::accuracy::AccuracyUnavailable`].
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Required columns are missing from the uploaded table
    #[error("CSV must contain 'Date' and 'Sales' columns (missing: {})", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The upload could not be read as CSV at all
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// A date value could not be parsed under the day-first convention
    #[error("Cannot parse date '{value}' in data row {row}")]
    DateParse { row: usize, value: String },

    /// The upload parsed but contains no data rows
    #[error("The uploaded dataset contains no rows")]
    EmptyDataset,

    /// The requested display window violates its constraints
    #[error("Invalid prediction window: {0}")]
    InvalidWindow(String),

    /// The forecasting model failed to fit or predict
    #[error("Forecasting failure: {0}")]
    Forecasting(String),

    /// Error from Polars DataFrame operations while shaping tables
    #[error("DataFrame error: {0}")]
    DataFrame(String),
}

impl ComputeError {
    /// Stable machine readable code used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            ComputeError::Schema { .. } => "SCHEMA_ERROR",
            ComputeError::MalformedUpload(_) => "MALFORMED_UPLOAD",
            ComputeError::DateParse { .. } => "DATE_PARSE_ERROR",
            ComputeError::EmptyDataset => "EMPTY_DATASET",
            ComputeError::InvalidWindow(_) => "INVALID_WINDOW",
            ComputeError::Forecasting(_) => "FORECASTING_FAILURE",
            ComputeError::DataFrame(_) => "INTERNAL_ERROR",
        }
    }
}

// Implement From<polars::error::PolarsError> for ComputeError
impl From<polars::error::PolarsError> for ComputeError {
    fn from(error: polars::error::PolarsError) -> Self {
        let compute_error = match error {
            polars::error::PolarsError::NoData(_) => {
                ComputeError::DataFrame(format!("No data: {}", error))
            }
            polars::error::PolarsError::ShapeMismatch(_) => {
                ComputeError::DataFrame(format!("Shape mismatch: {}", error))
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                ComputeError::DataFrame(format!("Schema mismatch: {}", error))
            }
            polars::error::PolarsError::ColumnNotFound(_) => {
                ComputeError::DataFrame(format!("Column not found: {}", error))
            }
            _ => ComputeError::DataFrame(format!("{}", error)),
        };
        error!(?compute_error, "DataFrame error");
        compute_error
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
