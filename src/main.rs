//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stream_probe` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing probe results as JSON
//!
//! All probe logic is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use stream_probe::config::{Cli, Command};
use stream_probe::initialization::init_logger_with;
use stream_probe::{probe, start_server, ResponseCache, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger_with(cli.log_level.into(), cli.log_format).context("Failed to initialize logger")?;

    match cli.command {
        Command::Probe(args) => {
            let pretty = args.pretty;
            let request = args.into_request()?;

            // A one-shot probe has nobody to serve downloads to
            let cache = ResponseCache::default();
            let result = probe(request, &cache).await;

            let json = if pretty {
                serde_json::to_string_pretty(&result)
            } else {
                serde_json::to_string(&result)
            }
            .context("Failed to serialize probe result")?;
            println!("{}", json);
        }
        Command::Serve(args) => {
            let config = ServerConfig::from(args);
            info!(
                "Starting probe server on {}:{} (cache TTL {}s)",
                config.bind_address,
                config.port,
                config.cache_ttl.as_secs()
            );
            start_server(config).await?;
        }
    }

    Ok(())
}
