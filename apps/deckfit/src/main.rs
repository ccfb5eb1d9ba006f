mod config;
mod errors;
mod images;
mod layout;
mod models;
mod output;
mod pipeline;
mod script;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::images::ImageCache;
use crate::output::write_plan;
use crate::pipeline::DeckBuilder;
use crate::script::parse_script;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting deckfit v{}", env!("CARGO_PKG_VERSION"));

    // Read and parse the slide script
    let script = tokio::fs::read_to_string(&config.input_path)
        .await
        .with_context(|| format!("Failed to read slide script {}", config.input_path.display()))?;
    let slides = parse_script(&script)?;
    if slides.is_empty() {
        bail!("No slides found in {}", config.input_path.display());
    }
    info!("Parsed {} slides from {}", slides.len(), config.input_path.display());

    // Image cache is optional: without it every image is fetched
    let cache = match ImageCache::open(&config.cache_config()) {
        Ok(cache) => {
            info!("Image cache at {}", cache.dir().display());
            Some(cache)
        }
        Err(e) => {
            warn!("Image cache unavailable, continuing without it: {e}");
            None
        }
    };

    let builder = DeckBuilder::from_config(&config, cache)?;
    let plans = builder.build_deck(&slides).await;

    let placed: usize = plans.iter().map(|p| p.images.len()).sum();
    let skipped: usize = plans.iter().map(|p| p.skipped.len()).sum();

    // PNG encoding and file writes are blocking work
    let output_dir = config.output_dir.clone();
    let manifest = tokio::task::spawn_blocking(move || write_plan(&plans, &output_dir)).await??;

    info!(
        "Deck plan written to {} ({} images placed, {} skipped)",
        manifest.display(),
        placed,
        skipped
    );
    Ok(())
}
