use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod utils;

/// vitals - serve and probe service health endpoints
#[derive(Parser)]
#[command(name = "vitals")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the probe endpoints using the configured service metadata
    Serve {
        /// Configuration file (defaults to the standard search path)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Port to listen on
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Probe /health, /health/live and /health/ready
    Check {
        /// Base URL of the instance (defaults to `client.base_url` from config)
        #[arg(long, env = "VITALS_URL")]
        url: Option<String>,

        /// Request timeout in seconds (defaults to `client.timeout_secs` from config)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Show response details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the status document of an instance
    Status {
        /// Base URL of the instance (defaults to `client.base_url` from config)
        #[arg(long, env = "VITALS_URL")]
        url: Option<String>,

        /// Request timeout in seconds (defaults to `client.timeout_secs` from config)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the metrics exposition text of an instance
    Metrics {
        /// Base URL of the instance (defaults to `client.base_url` from config)
        #[arg(long, env = "VITALS_URL")]
        url: Option<String>,

        /// Request timeout in seconds (defaults to `client.timeout_secs` from config)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, port } => commands::serve::execute(config, port).await,
        Commands::Check {
            url,
            timeout,
            verbose,
        } => commands::check::execute(url, timeout, verbose).await,
        Commands::Status { url, timeout, json } => {
            commands::status::execute(url, timeout, json).await
        }
        Commands::Metrics { url, timeout } => commands::metrics::execute(url, timeout).await,
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["vitals", "check"]).unwrap();
        match cli.command {
            Commands::Check {
                url,
                timeout,
                verbose,
            } => {
                assert!(url.is_none() || std::env::var("VITALS_URL").is_ok());
                assert!(timeout.is_none());
                assert!(!verbose);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_status_flags() {
        let cli = Cli::try_parse_from([
            "vitals",
            "status",
            "--url",
            "http://orders:9000",
            "--timeout",
            "3",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Status { url, timeout, json } => {
                assert_eq!(url.as_deref(), Some("http://orders:9000"));
                assert_eq!(timeout, Some(3));
                assert!(json);
            }
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["vitals", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { port, config } => {
                assert_eq!(port, Some(9000));
                assert!(config.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }
}
