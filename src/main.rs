use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use cloudsea::cache;
use cloudsea::config::CloudSeaConfig;
use cloudsea::service::CloudSeaService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = CloudSeaConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cache_path = shellexpand_home(&config.cache.location);
    if let Err(e) = cache::init(&cache_path) {
        // Predictions still work without the cache, every request just
        // goes upstream
        tracing::warn!("Cache disabled: {e:#}");
    }

    let service = Arc::new(CloudSeaService::new(config));
    cloudsea::web::run(service).await
}

/// Expand a leading `~` to the user's home directory
fn shellexpand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{home}/{rest}"),
        _ => path.to_string(),
    }
}
