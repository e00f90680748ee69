//! OSMviews - popularity ranks of places on Earth.
//!
//! This binary wraps the library's reader and download routine.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osmviews::{
    config::{Cli, Command, DownloadConfig, InfoConfig, OutputFormat, RankConfig},
    fetch::{download_from, FetchOutcome},
    format::tiff::RasterGeometry,
    Reader,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Rank(config) => run_rank(config),
        Command::Info(config) => run_info(config),
        Command::Download(config) => run_download(config),
    }
}

/// Initialize the tracing subscriber.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "osmviews=debug"
    } else {
        "osmviews=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Rank Command
// =============================================================================

#[derive(Serialize)]
struct RankOutput {
    lat: f64,
    lng: f64,
    rank: f64,
}

fn run_rank(config: RankConfig) -> ExitCode {
    let mut reader = match Reader::open_with_cache_capacity(&config.file, config.cache_tiles) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to open {}: {}", config.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut results = Vec::new();
    for (lat, lng) in config.pairs() {
        match reader.rank(lat, lng) {
            Ok(rank) => results.push(RankOutput { lat, lng, rank }),
            Err(e) => {
                error!("Lookup of ({}, {}) failed: {}", lat, lng, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let stats = reader.cache_stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        "Tile cache"
    );
    reader.close();

    match config.output {
        OutputFormat::Text => {
            for r in &results {
                println!("{}\t{}\t{}", r.lat, r.lng, r.rank);
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&results),
    }
}

// =============================================================================
// Info Command
// =============================================================================

#[derive(Serialize)]
struct InfoOutput<'a> {
    file: String,
    byte_order: &'static str,
    geometry: &'a RasterGeometry,
}

fn run_info(config: InfoConfig) -> ExitCode {
    let reader = match Reader::open(&config.file) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to open {}: {}", config.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let info = InfoOutput {
        file: config.file.display().to_string(),
        byte_order: reader.byte_order().as_str(),
        geometry: reader.geometry(),
    };
    let code = print_json(&info);
    reader.close();
    code
}

// =============================================================================
// Download Command
// =============================================================================

fn run_download(config: DownloadConfig) -> ExitCode {
    info!("Fetching {} into {}", config.url, config.file.display());

    match download_from(&config.file, &config.url) {
        Ok(FetchOutcome::NotModified) => {
            println!("{} is up to date", config.file.display());
            ExitCode::SUCCESS
        }
        Ok(FetchOutcome::Downloaded { bytes }) => {
            println!("Downloaded {} bytes to {}", bytes, config.file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Download failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}
