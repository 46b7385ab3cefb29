//! Database implementations

pub mod manager;
pub mod settings_repository;

pub use manager::{DbManager, SqliteConnection};
pub use settings_repository::SqliteSettingsRepository;
