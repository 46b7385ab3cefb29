//! Infrastructure error handling

pub mod conversions;

pub use conversions::{into_domain, status_error, InfraError};
