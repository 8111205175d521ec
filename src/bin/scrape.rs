//! Command-line front end: scrape one URL with a JSON field configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stealth_scraper::{FieldConfig, ScraperConfig, ScraperService};
use tracing_subscriber::EnvFilter;

/// Extract fields from a web page.
#[derive(Debug, Parser)]
#[command(name = "scrape")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Page URL
    url: String,

    /// Field configuration, e.g. '{"price": ".price", "meta": ["keywords"]}'
    fields: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not write the raw page to the debug dump file
    #[arg(long)]
    no_debug_dump: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    let mut config = match &cli.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if cli.no_debug_dump {
        config = config.without_debug_dump();
    }

    let fields = FieldConfig::from_json(&cli.fields).map_err(|e| e.into_user_message(&cli.url))?;
    let service = ScraperService::new(&config).map_err(|e| e.into_user_message(&cli.url))?;
    let result = service
        .extract(&cli.url, &fields)
        .map_err(|failure| failure.to_string())?;

    serde_json::to_string_pretty(&result).map_err(|e| format!("Failed to serialize result: {}", e))
}
