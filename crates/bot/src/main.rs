//! Rendezvous - calendar chat bot
//!
//! Main entry point: loads configuration, initialises logging and runs the
//! enabled chat channels until Ctrl-C.

use std::path::PathBuf;

use anyhow::Context;
use rendezvous_bot::AppContext;
use rendezvous_infra::config;
use rendezvous_infra::observability::{init_tracing, LogFormat};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read .env before logging so RUST_LOG from the file applies.
    let dotenv = dotenvy::dotenv();
    init_tracing(LogFormat::from_env()).context("initialising logging")?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env file loaded"),
    }

    let config = match std::env::var_os("RENDEZVOUS_CONFIG") {
        Some(path) => config::load_from_file(Some(PathBuf::from(path))),
        None => config::load(),
    }
    .context("loading configuration")?;

    let context = AppContext::new(config).context("initialising application")?;
    info!("Rendezvous starting...");

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                signal_shutdown.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let outcome = context.run(shutdown).await;
    context.close().context("closing settings store")?;
    outcome.context("chat channel failed")?;

    info!("Rendezvous stopped");
    Ok(())
}
