//! Altimetry query command-line tool.
//!
//! Opens a source (a catalog collection, a half-orbit file directory or a
//! table file), runs one query against it and prints the result as JSON on
//! stdout. Logs go to stderr.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use alti_io::{
    AltimetryConfig, AltimetryData, CatalogSource, FileCollectionSource, TableSource, CATALOG_ENV,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "alti-query")]
#[command(about = "Query satellite altimetry collections")]
struct Args {
    /// Catalog file listing named collections
    #[arg(long, env = CATALOG_ENV)]
    catalog: Option<PathBuf>,

    /// Collection of the catalog to query
    #[arg(short, long)]
    collection: Option<String>,

    /// Directory of half-orbit files, instead of a catalog collection
    #[arg(long, conflicts_with_all = ["collection", "table"])]
    files: Option<PathBuf>,

    /// JSON table file, instead of a catalog collection
    #[arg(long, conflicts_with = "collection")]
    table: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `alti_io=debug,warn` (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let config = AltimetryConfig::from_env();
    config.validate()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(root) = &args.files {
        let source = FileCollectionSource::open(root, config.coordinates.clone())
            .with_context(|| format!("Failed to open collection {}", root.display()))?;
        return commands::run(&AltimetryData::new(source), args.command, &mut out);
    }

    if let Some(path) = &args.table {
        let source = TableSource::open(path, config.coordinates.clone())
            .with_context(|| format!("Failed to open table {}", path.display()))?;
        return commands::run(&AltimetryData::new(source), args.command, &mut out);
    }

    let Some(name) = &args.collection else {
        bail!("one of --collection, --files or --table is required");
    };
    let catalog_path = args
        .catalog
        .clone()
        .or(config.catalog.clone())
        .with_context(|| format!("--catalog or {} is required with --collection", CATALOG_ENV))?;
    let catalog = alti_io::Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

    info!(collection = %name, catalog = %catalog_path.display(), "Opening collection");
    let source = CatalogSource::open(Arc::new(catalog), name)
        .with_context(|| format!("Failed to open collection {}", name))?;
    commands::run(&AltimetryData::new(source), args.command, &mut out)
}

fn log_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

fn init_tracing(log_level: &str, json: bool) {
    let builder = fmt()
        .with_env_filter(log_filter(log_level))
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
