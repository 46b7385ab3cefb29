//! Calendar backend port interfaces
//!
//! Implemented in `rendezvous-infra` by the CalDAV, office-suite and
//! remote-proxy adapters.

use std::sync::Arc;

use async_trait::async_trait;
use rendezvous_domain::{CalendarSettings, Event, Result, TimeRange};

/// Remote side of a [`crate::Calendar`].
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Fetch the events stored remotely that overlap `range`.
    ///
    /// Fails with `Network` when the backend is unreachable and `Auth` when
    /// credentials are rejected.
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>>;

    /// Write one event. `Ok(false)` means the backend answered but did not
    /// accept the write.
    async fn write_remote_event(&self, event: &Event) -> Result<bool>;
}

/// Builds a backend from a user's stored calendar settings.
pub trait BackendFactory: Send + Sync {
    fn create(&self, settings: &CalendarSettings) -> Result<Arc<dyn CalendarBackend>>;
}
