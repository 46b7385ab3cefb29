//! Logging initialisation
//!
//! Everything logs through `tracing`. The binary installs one global
//! subscriber at startup; the filter comes from `RUST_LOG` and defaults to
//! `info`. Set `RENDEZVOUS_LOG_FORMAT=json` for structured output.

use rendezvous_domain::{RendezvousError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Format selected by `RENDEZVOUS_LOG_FORMAT`.
    pub fn from_env() -> Self {
        match std::env::var("RENDEZVOUS_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber. Logs go to stderr so the terminal chat
/// channel keeps stdout to itself.
///
/// # Errors
/// Returns `RendezvousError::Config` if the filter is invalid or a global
/// subscriber was already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| RendezvousError::Config(format!("invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| RendezvousError::Config(format!("tracing already initialised: {e}")))
}
