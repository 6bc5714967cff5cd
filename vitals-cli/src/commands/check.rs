use anyhow::Result;
use colored::Colorize;
use vitals::prelude::{paths, Client, Context};

use crate::utils;

/// Outcome of one probe endpoint
#[derive(Debug)]
struct Probe {
    name: &'static str,
    path: &'static str,
    passed: bool,
    details: Vec<String>,
}

pub async fn execute(url: Option<String>, timeout: Option<u64>, verbose: bool) -> Result<()> {
    println!("{}", "Checking service health...".bold());
    println!();

    let target = utils::client_config(url, timeout)?;
    let client = utils::client(&target)?;
    let ctx = utils::context(&target);
    let probes = run_probes(&client, &ctx).await;

    for probe in &probes {
        let verdict = if probe.passed {
            "✓ OK".green().bold()
        } else {
            "✗ FAILED".red().bold()
        };
        println!(
            "{} endpoint ({}{})... {}",
            probe.name,
            client.base_url(),
            probe.path,
            verdict
        );

        if verbose || !probe.passed {
            for line in &probe.details {
                println!("  {}", line);
            }
        }
    }

    println!();

    let failed = probes.iter().filter(|p| !p.passed).count();
    if failed > 0 {
        anyhow::bail!("{} of {} probes failed", failed, probes.len());
    }

    println!("{}", "Service is healthy, alive and ready!".green().bold());

    Ok(())
}

/// Query the three probe endpoints, recording failures instead of stopping early
async fn run_probes(client: &Client, ctx: &Context) -> Vec<Probe> {
    let health = match client.health(ctx).await {
        Ok(resp) => Probe {
            name: "Health",
            path: paths::HEALTH,
            passed: resp.status.is_healthy(),
            details: vec![
                format!("Status: {}", resp.status),
                format!("Timestamp: {}", resp.timestamp.to_rfc3339()),
            ],
        },
        Err(e) => failed("Health", paths::HEALTH, e),
    };

    let liveness = match client.liveness(ctx).await {
        Ok(resp) => Probe {
            name: "Liveness",
            path: paths::LIVENESS,
            passed: resp.alive,
            details: vec![
                format!("Alive: {}", resp.alive),
                format!("Timestamp: {}", resp.timestamp.to_rfc3339()),
            ],
        },
        Err(e) => failed("Liveness", paths::LIVENESS, e),
    };

    let readiness = match client.readiness(ctx).await {
        Ok(resp) => {
            let mut details = vec![
                format!("Ready: {}", resp.ready),
                format!("Timestamp: {}", resp.timestamp.to_rfc3339()),
            ];
            let mut checks: Vec<_> = resp.checks.iter().collect();
            checks.sort();
            details.extend(
                checks
                    .into_iter()
                    .map(|(name, value)| format!("Check {}: {}", name, value)),
            );
            Probe {
                name: "Readiness",
                path: paths::READINESS,
                passed: resp.ready,
                details,
            }
        }
        Err(e) => failed("Readiness", paths::READINESS, e),
    };

    vec![health, liveness, readiness]
}

fn failed(name: &'static str, path: &'static str, err: vitals::Error) -> Probe {
    Probe {
        name,
        path,
        passed: false,
        details: vec![format!("Error: {}", err)],
    }
}
