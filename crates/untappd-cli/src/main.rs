mod crawl;
mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "untappd-cli")]
#[command(about = "Scrape beers and check-ins from Untappd through a WebDriver browser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the beer page URLs listed for each search term
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Scrape a single beer page
    Beer {
        url: String,

        /// Print the beer and every check-in as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search, scrape every beer found and write snapshot and CSV files
    Crawl {
        #[arg(required = true)]
        terms: Vec<String>,

        /// Output directory (defaults to UNTAPPD_OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Scrape at most this many distinct beers
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rebuild the CSV files from a saved snapshot
    Export {
        snapshot: PathBuf,

        /// Output directory (defaults to the snapshot's directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Commands {
    /// `true` for commands that drive a browser and so need the app config.
    fn uses_browser(&self) -> bool {
        !matches!(self, Commands::Export { .. })
    }
}

const DEFAULT_LOG_LEVEL: &str = "info";

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = if cli.command.uses_browser() {
        Some(untappd_core::load_app_config_from_env()?)
    } else {
        None
    };
    init_tracing(config.as_ref().map_or(DEFAULT_LOG_LEVEL, |c| c.log_level.as_str()))?;

    match (cli.command, config) {
        (Commands::Export { snapshot, out }, _) => export::run_export(&snapshot, out.as_deref()),
        (Commands::Search { terms }, Some(config)) => crawl::run_search(&config, &terms).await,
        (Commands::Beer { url, json }, Some(config)) => {
            crawl::run_beer(&config, &url, json).await
        }
        (Commands::Crawl { terms, out, limit }, Some(config)) => {
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            crawl::run_crawl(&config, &terms, &out_dir, limit).await
        }
        (_, None) => anyhow::bail!("configuration was not loaded"),
    }
}
