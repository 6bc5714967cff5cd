use anyhow::{Context as _, Result};
use colored::Colorize;
use vitals::prelude::StatusResponse;

use crate::utils;

pub async fn execute(url: Option<String>, timeout: Option<u64>, json: bool) -> Result<()> {
    let target = utils::client_config(url, timeout)?;
    let client = utils::client(&target)?;
    let status = client
        .status(&utils::context(&target))
        .await
        .with_context(|| format!("Failed to fetch status from {}", client.base_url()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("Failed to encode status")?
        );
        return Ok(());
    }

    utils::section(&format!("{} {}", status.service_name, status.version));
    for line in render(&status) {
        println!("{}", line);
    }

    if status.dependencies.is_empty() {
        return Ok(());
    }

    utils::section("Dependencies");
    for dep in &status.dependencies {
        let label = match &dep.version {
            Some(version) => format!("{} ({}): {}", dep.name, version, dep.status),
            None => format!("{}: {}", dep.name, dep.status),
        };
        if vitals::prelude::READY_CHECK_VALUES.contains(&dep.status.as_str()) {
            utils::success(&label);
        } else {
            utils::warning(&label);
        }
    }

    Ok(())
}

/// Key/value lines describing the instance, optional fields omitted
fn render(status: &StatusResponse) -> Vec<String> {
    let mut lines = vec![
        format!("{:<12} {}", "Environment:".bold(), status.environment),
        format!("{:<12} {}", "Started:".bold(), status.start_time.to_rfc3339()),
        format!(
            "{:<12} {}",
            "Uptime:".bold(),
            utils::format_uptime(status.uptime_seconds)
        ),
    ];

    if let Some(hostname) = &status.hostname {
        lines.push(format!("{:<12} {}", "Hostname:".bold(), hostname));
    }
    if let Some(commit) = &status.git_commit {
        lines.push(format!("{:<12} {}", "Commit:".bold(), commit));
    }
    if let Some(build_time) = &status.build_time {
        lines.push(format!("{:<12} {}", "Built:".bold(), build_time.to_rfc3339()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals::prelude::Dependency;

    fn status() -> StatusResponse {
        serde_json::from_value(serde_json::json!({
            "service_name": "orders",
            "version": "2.1.0",
            "start_time": "2024-01-01T00:00:00Z",
            "uptime_seconds": 3661,
            "environment": "prod",
        }))
        .unwrap()
    }

    #[test]
    fn test_render_skips_missing_fields() {
        colored::control::set_override(false);
        let lines = render(&status());

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("prod"));
        assert!(lines[2].ends_with("1h 1m 1s"));
    }

    #[test]
    fn test_render_optional_fields() {
        colored::control::set_override(false);
        let mut status = status();
        status.hostname = Some("node-1".to_string());
        status.git_commit = Some("abc123".to_string());
        status.dependencies.push(Dependency::new("db", "connected"));

        let lines = render(&status);
        assert_eq!(lines.len(), 5);
        assert!(lines[3].ends_with("node-1"));
        assert!(lines[4].ends_with("abc123"));
    }
}
