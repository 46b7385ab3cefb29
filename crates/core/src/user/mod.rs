//! User settings

pub mod ports;

pub use ports::SettingsRepository;
