mod config;
mod errors;
mod export;
mod layout;
mod models;
mod render;
mod routes;
mod source;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::generate_document;
use crate::layout::DocumentFormat;
use crate::routes::build_router;
use crate::source::{source_for, FileSource, RecordLoader, RecordSource};
use crate::state::{compose_options, AppState};

#[derive(Parser)]
#[command(name = "cv-api")]
#[command(version)]
#[command(about = "Renders a CV record as full, resume or summary PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Write one document to disk and exit
    Export {
        /// Document format: full, resume or summary
        #[arg(short, long)]
        format: DocumentFormat,

        /// Output directory (defaults to CV_OUTPUT_DIR)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fails on malformed values; every variable has a default.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loader = build_loader(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, loader).await,
        Command::Export { format, out_dir } => {
            let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            let exported = generate_document(&loader, format, compose_options(&config))
                .await
                .with_context(|| format!("failed to export {format} document"))?;
            let path = exported
                .save_in(&dir)
                .await
                .with_context(|| format!("failed to write into {}", dir.display()))?;
            println!("wrote {} ({} pages)", path.display(), exported.page_count);
            Ok(())
        }
    }
}

async fn serve(config: Config, loader: RecordLoader) -> Result<()> {
    info!("Starting CV API v{}", env!("CARGO_PKG_VERSION"));
    info!("CV data source: {}", loader.source_description());

    let port = config.port;
    let state = AppState::new(config, loader);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wires the configured source, seeding the cache from the fallback file
/// when one is configured and readable.
async fn build_loader(config: &Config) -> Result<RecordLoader> {
    let source = source_for(&config.data_source, config.fetch_timeout)
        .with_context(|| format!("invalid CV data source '{}'", config.data_source))?;

    let Some(path) = &config.data_fallback else {
        return Ok(RecordLoader::new(source));
    };
    match FileSource::new(path).fetch().await {
        Ok(seed) => {
            info!("Seeded CV cache from {}", path.display());
            Ok(RecordLoader::with_seed(source, seed))
        }
        Err(e) => {
            warn!("Ignoring CV_DATA_FALLBACK {}: {e}", path.display());
            Ok(RecordLoader::new(source))
        }
    }
}
