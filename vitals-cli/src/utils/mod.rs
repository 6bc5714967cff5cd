use anyhow::{Context as _, Result};
use colored::Colorize;
use std::time::Duration;
use vitals::prelude::{Client, ClientConfig, Config, Context};

/// Target instance from `--url` / `--timeout`, falling back to the `client`
/// config section for whatever the flags leave out
pub fn client_config(url: Option<String>, timeout: Option<u64>) -> Result<ClientConfig> {
    let fallback = match (&url, timeout) {
        (Some(_), Some(_)) => ClientConfig::default(),
        _ => Config::load().context("Failed to load config")?.client,
    };
    Ok(resolve(url, timeout, fallback))
}

/// Overlay flag values on `fallback`
fn resolve(url: Option<String>, timeout: Option<u64>, fallback: ClientConfig) -> ClientConfig {
    ClientConfig {
        base_url: url.unwrap_or(fallback.base_url),
        timeout_secs: timeout.unwrap_or(fallback.timeout_secs),
    }
}

/// Build a client for the target instance
pub fn client(target: &ClientConfig) -> Result<Client> {
    Client::from_config(target)
        .with_context(|| format!("Failed to create client for {}", target.base_url))
}

/// Context bounded by the target's timeout; a zero timeout leaves it unbounded
pub fn context(target: &ClientConfig) -> Context {
    let timeout = target.timeout();
    if timeout.is_zero() {
        Context::background()
    } else {
        Context::background().with_timeout(timeout)
    }
}

/// Render whole seconds as `1d 2h 3m 4s`, dropping leading zero units
pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, secs)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Success message with checkmark
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Section header
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}
