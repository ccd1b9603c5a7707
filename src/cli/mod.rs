use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::Settings;
use commands::{forecast, serve, ForecastArgs};

#[derive(Parser)]
#[command(name = "salescast")]
#[command(about = "Sales forecasting service and command line tool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind
        #[arg(short, long, env = "SALESCAST_BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Forecast a CSV file and print the result
    ///
    /// The file needs a header row with `Date` and `Sales` columns. Dates are
    /// read day first, so 01/02/2024 is the 1st of February.
    Forecast(ForecastArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut settings = Settings::load()?;
        match self.command {
            Commands::Serve { bind_address } => {
                if let Some(bind_address) = bind_address {
                    settings.bind_address = bind_address;
                }
                serve(settings).await?;
            }
            Commands::Forecast(args) => {
                forecast(&args, &settings)?;
            }
        }
        Ok(())
    }
}
