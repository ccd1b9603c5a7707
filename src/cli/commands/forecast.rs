use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use compute::pipeline::{load_series, run_pipeline, ForecastRun, UploadSummary};
use compute::window::DisplayWindow;
use std::path::PathBuf;
use tracing::{debug, error, info, trace, warn};

use crate::config::Settings;
use crate::helpers::converters::{convert_accuracy, convert_forecast_run};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// CSV file with `Date` and `Sales` columns
    #[arg(short, long)]
    pub input: PathBuf,
    /// First day shown (YYYY-MM-DD), defaults to the day after the history
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// Last day shown (YYYY-MM-DD), defaults to 90 days after the history
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Also write the forecast chart as an HTML page to this file
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

pub fn forecast(args: &ForecastArgs, settings: &Settings) -> Result<()> {
    trace!("Entering forecast function");
    debug!("Reading sales history from {}", args.input.display());

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let run = match forecast_bytes(&bytes, args.start_date, args.end_date, settings.max_horizon_days) {
        Ok(run) => run,
        Err(e) => {
            error!("Forecast failed: {}", e);
            return Err(e);
        }
    };

    print!("{}", render_output(&run, args.format)?);

    if let Some(path) = &args.chart {
        std::fs::write(path, run.chart_html())
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        info!("Chart written to {}", path.display());
    }

    Ok(())
}

fn forecast_bytes(
    bytes: &[u8],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    max_horizon_days: i64,
) -> Result<ForecastRun> {
    let series = load_series(bytes)?;
    debug!("Read {} rows from the upload", series.len());

    let window = DisplayWindow::resolve_bounded(&series, start_date, end_date, max_horizon_days)?;
    let forecaster = compute::default_forecaster();
    Ok(run_pipeline(&forecaster, series, window)?)
}

fn render_output(run: &ForecastRun, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let accuracy = convert_accuracy(&run.accuracy);
            if !accuracy.available {
                warn!("{}", accuracy.message);
            }
            let summary = UploadSummary::from_series(&run.history)?;
            Ok(format!(
                "File uploaded successfully: {} rows from {} to {}\nForecast from {} to {}\n{}\n{}\n",
                summary.rows,
                summary.first_date,
                summary.last_date,
                run.window.start_date(),
                run.window.end_date(),
                run.table()?,
                accuracy.message
            ))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&convert_forecast_run(run)?)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&convert_forecast_run(run)?)?),
    }
}
