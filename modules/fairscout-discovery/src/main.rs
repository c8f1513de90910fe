use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fairscout_archive::{Archive, ArchiveConfig, CacheStore, RateLimiter};
use fairscout_common::{Config, DiscoveryRequest, QualityLevel};
use fairscout_discovery::Orchestrator;

/// Discover exhibitor documents for a trade fair.
#[derive(Parser, Debug)]
#[command(name = "fairscout", version)]
struct Cli {
    /// Fair name, e.g. "Fruit Logistica".
    #[arg(long)]
    name: String,
    /// Official website, when already known.
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Ignore and do not write the on-disk cache.
    #[arg(long)]
    no_cache: bool,
    /// Write the JSON result here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fairscout=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(fair = cli.name.as_str(), "fairscout starting...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.log_redacted();

    let archive = Archive::new(ArchiveConfig::from_config(&config))
        .context("Failed to set up fetchers")?;
    let cache = (!cli.no_cache).then(|| Arc::new(CacheStore::new(&config.cache_dir)));

    let orchestrator = Orchestrator::new(
        Arc::new(archive),
        Arc::new(RateLimiter::default()),
        cache,
        config.budget,
    );

    let request = DiscoveryRequest {
        fair_name: cli.name,
        known_url: cli.url,
        city: cli.city,
        country: cli.country,
    };
    let output = orchestrator.discover(&request).await;

    let found = output
        .quality
        .iter()
        .filter(|(_, q)| **q != QualityLevel::Missing)
        .count();
    info!(
        official_url = ?output.official_url,
        fields_found = found,
        elapsed_ms = output.debug.elapsed_ms,
        "Discovery complete"
    );

    let json = serde_json::to_string_pretty(&output)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Result written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
