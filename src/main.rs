//! # Stylesmith - Theme-aware Sass builds
//!
//! Compiles one stylesheet per theme for a component library.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build every theme once
//! cargo run -- --root src
//!
//! # Rebuild whenever a .scss file changes
//! cargo run -- --root src --watch
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stylesmith_core::{watch, BuildConfig, Builder};

/// Stylesmith - build per-theme stylesheets
#[derive(Parser, Debug)]
#[command(name = "stylesmith")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project root containing `themes/` and `components/`
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to `<root>/stylesmith.toml` if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rebuild whenever a style file changes
    #[arg(short, long)]
    watch: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::debug!("Starting Stylesmith v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &args.config {
        Some(path) => BuildConfig::load_from(path)?,
        None => BuildConfig::discover(&args.root)?,
    };
    let layout = config.resolve(&args.root)?;

    // Build once, then optionally keep watching
    let builder = Builder::with_grass(layout);
    builder.compile().await;

    if args.watch {
        watch(&builder)
            .await
            .map_err(|e| anyhow::anyhow!("Watch error: {}", e))?;
    }

    Ok(())
}
