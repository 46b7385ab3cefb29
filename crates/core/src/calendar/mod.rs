//! Calendar abstraction with a local write buffer

pub mod ports;
pub mod service;

pub use ports::{BackendFactory, CalendarBackend};
pub use service::Calendar;
