//! bot-bridge: host loop for the decision gateway
//!
//! Reads one input vector pair per line from stdin (JSON, `[[..],[..]]`) and
//! writes one output vector per line to stdout. Every input line gets an
//! answer; malformed lines are answered with the failsafe vector.
//!
//! Usage: `bot-bridge <blue|orange> [port-file]`

use anyhow::{Context, Result};
use bot_bridge_client::BridgeClient;
use bot_bridge_core::{BridgeConfig, DEFAULT_PORT_FILE, InputVectorPair, OutputVector, Team};
use std::io::{BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let team: Team = args
        .get(1)
        .context("usage: bot-bridge <blue|orange> [port-file]")?
        .parse()?;
    let port_file = args.get(2).map(String::as_str).unwrap_or(DEFAULT_PORT_FILE);

    let config = BridgeConfig::load(port_file);
    info!("Connecting to decision gateway on port {}", config.port);

    let mut client = BridgeClient::with_config(team, config)?;
    info!("{} ready for {} team", client.get_bot_name(), team);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<InputVectorPair>(&line) {
            Ok(input) => client.get_output_vector(&input),
            Err(e) => {
                warn!("Ignoring malformed input line: {}", e);
                OutputVector::FAILSAFE
            }
        };

        serde_json::to_writer(&mut stdout, &output)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    info!("Input closed, shutting down");
    Ok(())
}
