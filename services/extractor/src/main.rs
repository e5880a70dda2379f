//! Fire-flux grid extraction CLI.
//!
//! Retrieves a gridded variable from a GES DISC OPeNDAP dataset, expands
//! the time x latitude x longitude grid into rows, reverse-geocodes each
//! coordinate into administrative attributes, and prints the assembled
//! table (optionally exporting it to CSV).
//!
//! Control flow is strictly linear: fetch, expand, enrich, output. All
//! logging goes to stderr so the table owns stdout.

mod config;
mod output;
mod pipeline;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use flux_common::Credentials;
use geocode_client::{CachedGeocoder, NominatimClient};
use opendap_client::OpendapClient;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::JobConfig;
use pipeline::PipelineOptions;

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Extract a gridded fire-flux variable with geocoded enrichment")]
struct Args {
    /// OPeNDAP URL of the dataset
    #[arg(long, env = "DATASET_URL")]
    url: Option<String>,

    /// Name of the variable of interest
    #[arg(short, long)]
    variable: Option<String>,

    /// Job configuration file (YAML)
    #[arg(long)]
    job: Option<PathBuf>,

    /// Earthdata username (pairs with --password)
    #[arg(long, env = "EARTHDATA_USERNAME")]
    username: Option<String>,

    /// Earthdata password
    #[arg(long, env = "EARTHDATA_PASSWORD")]
    password: Option<String>,

    /// Two-field credentials file: username,password
    #[arg(long, default_value = "credentials.txt")]
    credentials_file: PathBuf,

    /// Base URL of the reverse-geocoding provider
    #[arg(long, env = "GEOCODER_URL")]
    geocoder_url: Option<String>,

    /// Write the result table to this CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip reverse geocoding (structural dry run)
    #[arg(long)]
    no_enrich: bool,

    /// Cap the number of rows carried into enrichment
    #[arg(long)]
    limit: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting fire-flux extraction");

    let job = match &args.job {
        Some(path) => Some(JobConfig::load(path)?),
        None => None,
    };

    let url = args
        .url
        .clone()
        .or_else(|| job.as_ref().map(|j| j.dataset.url.clone()));
    let Some(url) = url else {
        bail!("No dataset URL given: pass --url or a --job file");
    };

    let variable = args
        .variable
        .clone()
        .or_else(|| job.as_ref().map(|j| j.dataset.variable.clone()));
    let Some(variable) = variable else {
        bail!("No variable given: pass --variable or a --job file");
    };

    let credentials = resolve_credentials(&args, job.as_ref())?;

    let client = OpendapClient::new(credentials).context("Failed to build data-server client")?;

    let mut geocoder_config = job
        .as_ref()
        .map(|j| j.geocoder.to_client_config())
        .unwrap_or_default();
    if let Some(endpoint) = &args.geocoder_url {
        geocoder_config.endpoint = endpoint.clone();
    }

    let geocoder = CachedGeocoder::new(
        NominatimClient::new(geocoder_config).context("Failed to build geocoding client")?,
    );

    let options = PipelineOptions {
        limit: args.limit,
        skip_enrichment: args.no_enrich,
    };

    let data = pipeline::fetch(&client, &url, &variable).await?;
    let table = pipeline::build_table(&variable, &data, &geocoder, options).await?;

    output::print_table(&table)?;

    let csv_path = args
        .output
        .clone()
        .or_else(|| job.as_ref().and_then(|j| j.output.csv.clone()));
    if let Some(path) = csv_path {
        output::write_csv(&table, &path)?;
    }

    info!(
        rows = table.len(),
        unique_coordinates = geocoder.len().await,
        "Extraction complete"
    );

    Ok(())
}

/// Resolve credentials: explicit values win, else the credentials file.
fn resolve_credentials(args: &Args, job: Option<&JobConfig>) -> Result<Credentials> {
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        return Ok(Credentials::new(username, password));
    }

    let path = job
        .and_then(|j| j.dataset.credentials_file.clone())
        .unwrap_or_else(|| args.credentials_file.clone());

    Credentials::from_file(&path)
        .with_context(|| format!("Failed to load credentials from {}", path.display()))
}
