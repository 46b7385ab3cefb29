//! # Rendezvous Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Calendar backends (CalDAV, office-suite REST, remote proxy)
//! - The calendar proxy server
//! - The wit-style NLU client
//! - The SQLite settings repository
//! - Terminal and web chat channels
//! - Configuration loading and logging initialisation
//!
//! ## Architecture
//! - Implements traits defined in `rendezvous-core`
//! - Contains all "impure" code (network, database, stdin/stdout)

pub mod channels;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod proxy;

pub use channels::{Outbox, TerminalChannel, WriterSink};
pub use database::{DbManager, SqliteSettingsRepository};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::{create_backend, CalendarBackendImpl, HttpBackendFactory};
pub use integrations::nlu::WitClient;
