use anyhow::{Context as _, Result};

use crate::utils;

pub async fn execute(url: Option<String>, timeout: Option<u64>) -> Result<()> {
    let target = utils::client_config(url, timeout)?;
    let client = utils::client(&target)?;
    let metrics = client
        .metrics(&utils::context(&target))
        .await
        .with_context(|| format!("Failed to fetch metrics from {}", client.base_url()))?;

    if metrics.is_empty() {
        utils::warning("Instance returned no metrics");
        return Ok(());
    }

    // Exposition text is passed through untouched
    print!("{}", metrics);
    if !metrics.ends_with('\n') {
        println!();
    }

    Ok(())
}
