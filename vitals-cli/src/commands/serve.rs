use anyhow::{Context as _, Result};
use std::path::PathBuf;
use vitals::prelude::*;

use crate::utils;

pub async fn execute(config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path, port)?;

    init_tracing(&config)?;

    let reporter = BaseReporter::from_config(&config);
    let app = HealthHandler::new(reporter)
        .with_request_timeout(config.service.timeout())
        .routes();

    utils::success(&format!(
        "Serving {} ({}) on port {}",
        config.service.name, config.service.environment, config.service.port
    ));

    Server::new(config).serve(app).await?;

    Ok(())
}

/// Load configuration from `path` or the default search path, then apply `--port`
fn load_config(path: Option<PathBuf>, port: Option<u16>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    if let Some(port) = port {
        config.service.port = port;
    }

    Ok(config)
}
