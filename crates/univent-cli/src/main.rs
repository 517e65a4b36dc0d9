//! Univent command line client.
//!
//! # Usage
//!
//! ```bash
//! # Log in against the local deployment
//! univent login ada@example.edu hunter2
//!
//! # Point the events service somewhere else
//! univent --service events=https://events.example.edu/api events
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use univent_cli::{
    ClientConfig, Command, Services, config::DEFAULT_STORE_PATH, parse_service_override,
};
use univent_client::{Dispatcher, ReqwestTransport};
use univent_session::SessionManager;
use univent_store::RedbCredentialStore;

/// Univent client
#[derive(Parser, Debug)]
#[command(name = "univent")]
#[command(about = "Command line client for the Univent event platform")]
#[command(version)]
struct Args {
    /// Credential database path
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Override a service address (NAME=URL, repeatable)
    #[arg(long = "service", value_parser = parse_service_override)]
    services: Vec<(String, String)>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Output goes to stdout, logs stay on stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = ClientConfig {
        store_path: args.store,
        timeout: args.timeout_secs.map(Duration::from_secs),
        ..Default::default()
    }
    .with_overrides(args.services)?;

    let store = RedbCredentialStore::open(&config.store_path)?;
    let transport = match config.timeout {
        Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
        None => ReqwestTransport::new()?,
    };

    let session = SessionManager::new(Dispatcher::new(config.router, store, transport));
    if session.restore() {
        tracing::debug!("resumed stored session");
    }

    let output = Services::new(session).run(args.command).await?;
    emit(&output);

    Ok(())
}

#[allow(clippy::print_stdout, reason = "command output is the product")]
fn emit(output: &str) {
    println!("{output}");
}
