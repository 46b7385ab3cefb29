//! Application configuration structures
//!
//! Loaded by `rendezvous_infra::config::loader` from environment variables or
//! a TOML/JSON file. Every section except `database` and `nlu` has defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MEETING_TITLE, DEFAULT_TIMEZONE};
use crate::types::CalendarSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub nlu: NluConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Settings store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Classifier endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Outbound HTTP behaviour shared by every adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    /// Total attempts per request (first try included).
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30, max_attempts: 3, base_backoff_ms: 200 }
    }
}

/// Conversation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Base URL of the settings form; the conversant key is appended.
    pub settings_url: String,
    pub default_timezone: String,
    pub meeting_title: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            settings_url: "http://localhost:8080/settings".into(),
            default_timezone: DEFAULT_TIMEZONE.into(),
            meeting_title: DEFAULT_MEETING_TITLE.into(),
        }
    }
}

/// Local stdin/stdout channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub enabled: bool,
    /// User id of the person at the terminal.
    pub user: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { enabled: true, user: "me".into() }
    }
}

/// Web chat channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { enabled: false, bind_address: "127.0.0.1:8081".into() }
    }
}

/// Calendar proxy server: exposes one configured backend to remote bots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_bind")]
    pub bind_address: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub backend: Option<CalendarSettings>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { enabled: false, bind_address: default_proxy_bind(), token: None, backend: None }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_proxy_bind() -> String {
    "127.0.0.1:8082".into()
}
