mod categories;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rentscout-cli")]
#[command(about = "Find rentals near the amenities you care about")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the configured amenity categories
    Categories {
        /// Path to the categories YAML file
        #[arg(
            long,
            env = "RENTSCOUT_CATEGORIES_PATH",
            default_value = "./config/categories.yaml"
        )]
        file: PathBuf,
    },
    /// Search every enabled category around a map position once
    Search(SearchArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArgs {
    /// Viewport center latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Viewport center longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
    /// Map zoom level (0-22)
    #[arg(long, default_value = "15")]
    zoom: f64,
    /// Width and height of the viewport in kilometres
    #[arg(long, default_value = "2")]
    span_km: f64,
    /// Also look up rental listings inside the top overlap regions
    #[arg(long)]
    listings: bool,
    /// Minimum monthly rent
    #[arg(long, requires = "listings")]
    price_min: Option<Decimal>,
    /// Maximum monthly rent
    #[arg(long, requires = "listings")]
    price_max: Option<Decimal>,
    /// Print JSON instead of a text report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Categories { file } => categories::run_categories(&file)?,
        Commands::Search(args) => {
            let config = rentscout_core::load_app_config()?;
            tracing::debug!(?config, "configuration loaded");
            search::run_search(&config, &args).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `RENTSCOUT_LOG_LEVEL`, otherwise `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("RENTSCOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
