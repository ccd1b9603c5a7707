pub mod forecast;
pub mod serve;

pub use forecast::{forecast, ForecastArgs, OutputFormat};
pub use serve::serve;
