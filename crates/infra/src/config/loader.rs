//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `RENDEZVOUS_DB_PATH`: Settings database file path
//! - `RENDEZVOUS_NLU_ENDPOINT`: Base URL of the classifier
//!
//! Optional (defaults as in the file format):
//! - `RENDEZVOUS_DB_POOL_SIZE`, `RENDEZVOUS_NLU_TOKEN`
//! - `RENDEZVOUS_HTTP_TIMEOUT`, `RENDEZVOUS_HTTP_MAX_ATTEMPTS`
//! - `RENDEZVOUS_SETTINGS_URL`, `RENDEZVOUS_TIMEZONE`,
//!   `RENDEZVOUS_MEETING_TITLE`
//! - `RENDEZVOUS_TERMINAL_ENABLED`, `RENDEZVOUS_TERMINAL_USER`
//! - `RENDEZVOUS_WEB_ENABLED`, `RENDEZVOUS_WEB_BIND`
//! - `RENDEZVOUS_PROXY_ENABLED`, `RENDEZVOUS_PROXY_BIND`,
//!   `RENDEZVOUS_PROXY_TOKEN`, `RENDEZVOUS_PROXY_BACKEND` (JSON-encoded
//!   calendar settings)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./rendezvous.toml` or `./rendezvous.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rendezvous_domain::{
    BotConfig, CalendarSettings, Config, DatabaseConfig, HttpConfig, NluConfig, ProxyConfig,
    RendezvousError, Result, TerminalConfig, WebConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["rendezvous.toml", "rendezvous.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RendezvousError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `RendezvousError::Config` if a required variable is missing or
/// any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let database = DatabaseConfig {
        path: env_var("RENDEZVOUS_DB_PATH")?,
        pool_size: env_parse("RENDEZVOUS_DB_POOL_SIZE")?.unwrap_or(4),
    };
    let nlu = NluConfig {
        endpoint: env_var("RENDEZVOUS_NLU_ENDPOINT")?,
        token: env_opt("RENDEZVOUS_NLU_TOKEN"),
    };

    let http_defaults = HttpConfig::default();
    let http = HttpConfig {
        timeout_seconds: env_parse("RENDEZVOUS_HTTP_TIMEOUT")?
            .unwrap_or(http_defaults.timeout_seconds),
        max_attempts: env_parse("RENDEZVOUS_HTTP_MAX_ATTEMPTS")?
            .unwrap_or(http_defaults.max_attempts),
        base_backoff_ms: http_defaults.base_backoff_ms,
    };

    let bot_defaults = BotConfig::default();
    let bot = BotConfig {
        settings_url: env_opt("RENDEZVOUS_SETTINGS_URL").unwrap_or(bot_defaults.settings_url),
        default_timezone: env_opt("RENDEZVOUS_TIMEZONE").unwrap_or(bot_defaults.default_timezone),
        meeting_title: env_opt("RENDEZVOUS_MEETING_TITLE").unwrap_or(bot_defaults.meeting_title),
    };

    let terminal_defaults = TerminalConfig::default();
    let terminal = TerminalConfig {
        enabled: env_bool("RENDEZVOUS_TERMINAL_ENABLED", terminal_defaults.enabled),
        user: env_opt("RENDEZVOUS_TERMINAL_USER").unwrap_or(terminal_defaults.user),
    };

    let web_defaults = WebConfig::default();
    let web = WebConfig {
        enabled: env_bool("RENDEZVOUS_WEB_ENABLED", web_defaults.enabled),
        bind_address: env_opt("RENDEZVOUS_WEB_BIND").unwrap_or(web_defaults.bind_address),
    };

    let proxy_defaults = ProxyConfig::default();
    let backend = env_opt("RENDEZVOUS_PROXY_BACKEND")
        .map(|raw| {
            serde_json::from_str::<CalendarSettings>(&raw).map_err(|e| {
                RendezvousError::Config(format!("Invalid RENDEZVOUS_PROXY_BACKEND: {e}"))
            })
        })
        .transpose()?;
    let proxy = ProxyConfig {
        enabled: env_bool("RENDEZVOUS_PROXY_ENABLED", proxy_defaults.enabled),
        bind_address: env_opt("RENDEZVOUS_PROXY_BIND").unwrap_or(proxy_defaults.bind_address),
        token: env_opt("RENDEZVOUS_PROXY_TOKEN"),
        backend,
    };

    Ok(Config { database, nlu, http, bot, terminal, web, proxy })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RendezvousError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RendezvousError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RendezvousError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RendezvousError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension
/// (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RendezvousError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RendezvousError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RendezvousError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RendezvousError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| RendezvousError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
