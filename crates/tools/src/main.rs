use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dashboard::{DashboardConfig, Geocoder};
use formats::parse_countries;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tools::{FileFetcher, HttpFetcher, bake_coordinates, load_table, summarize};

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline helpers for the wellbeing atlas dashboard")]
struct Args {
    /// Dashboard configuration JSON (defaults match the shipped layout)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the summaries and marker positions the dashboard would show
    Summarize {
        /// Directory the dashboard is served from
        #[arg(long, env = "DASH_DATA_ROOT", default_value = ".")]
        data_root: PathBuf,
    },

    /// Geocode listed countries into a coordinate table
    BakeCoords {
        /// Countries dataset to read names from
        #[arg(long, default_value = "data/top_ten_countries_depression.json")]
        countries: PathBuf,

        /// Output table
        #[arg(long, default_value = "data/country_coords.json")]
        out: PathBuf,

        /// Table whose entries are kept; only missing countries are looked up
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Geocoder search endpoint (default: GEOCODER_URL, then the config)
        #[arg(long)]
        geocoder_url: Option<String>,

        /// Pause between geocoder requests in milliseconds
        #[arg(long, default_value_t = 1000)]
        pause_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DashboardConfig::from_json_str(&tokio::fs::read_to_string(path).await?)?,
        None => DashboardConfig::default(),
    };

    match args.command {
        Command::Summarize { data_root } => {
            info!(root = %data_root.display(), "summarizing");
            let report = summarize(&FileFetcher::new(data_root), &config).await?;
            print!("{report}");
        }
        Command::BakeCoords {
            countries,
            out,
            existing,
            geocoder_url,
            pause_ms,
        } => {
            let geocoder_url = geocoder_url.unwrap_or_else(|| {
                env::var("GEOCODER_URL").unwrap_or_else(|_| config.geocoder_url.clone())
            });
            let records = parse_countries(&tokio::fs::read_to_string(&countries).await?)?;
            let table = match &existing {
                Some(path) => load_table(path).await?,
                None => load_table(&out).await?,
            };

            let fetcher = HttpFetcher::new()?;
            let geocoder = Geocoder::new(geocoder_url);
            let baked = bake_coordinates(
                &fetcher,
                &geocoder,
                &records,
                table,
                Duration::from_millis(pause_ms),
            )
            .await;

            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&out, baked.table.to_json_pretty()?).await?;
            info!(
                kept = baked.kept,
                found = baked.found,
                total = baked.table.len(),
                out = %out.display(),
                "coordinate table written"
            );
            if !baked.unmatched.is_empty() {
                warn!("no match for: {}", baked.unmatched.join(", "));
            }
            if !baked.failed.is_empty() {
                warn!("lookups failed for: {}", baked.failed.join(", "));
            }
        }
    }

    Ok(())
}
