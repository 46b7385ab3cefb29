//! Buffered calendar - read-your-writes over an unreliable backend

use std::sync::Arc;

use parking_lot::Mutex;
use rendezvous_domain::{sort_and_dedup, Event, Result, TimeRange};
use tracing::{debug, instrument, warn};

use super::ports::CalendarBackend;

/// One user's calendar for the duration of a dialogue turn.
///
/// Events handed to [`Calendar::schedule_event`] are kept in a local buffer
/// so that [`Calendar::get_events`] shows them before (or without) the remote
/// side confirming. A buffered event is dropped once a remote read returns a
/// structurally equal event.
///
/// The buffer is kept even when the remote write fails, so a read right
/// after a failed write still shows the event.
pub struct Calendar {
    owner: String,
    backend: Arc<dyn CalendarBackend>,
    buffer: Mutex<Vec<Event>>,
}

impl Calendar {
    /// `owner` labels the calendar in logs and scheduling outcomes.
    pub fn new(owner: impl Into<String>, backend: Arc<dyn CalendarBackend>) -> Self {
        Self { owner: owner.into(), backend, buffer: Mutex::new(Vec::new()) }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Remote events in `range` merged with buffered events overlapping it,
    /// sorted by start time without structural duplicates.
    #[instrument(skip(self), fields(owner = %self.owner))]
    pub async fn get_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        let remote = self.backend.fetch_remote_events(range).await?;

        let mut merged = remote.clone();
        {
            let mut buffer = self.buffer.lock();
            let before = buffer.len();
            buffer.retain(|event| !remote.contains(event));
            if buffer.len() != before {
                debug!(reconciled = before - buffer.len(), "buffered events confirmed by remote");
            }
            merged.extend(buffer.iter().filter(|event| event.overlaps(&range)).cloned());
        }

        sort_and_dedup(&mut merged);
        Ok(merged)
    }

    /// Buffer `event` locally, then write it to the backend.
    ///
    /// Returns `Ok(true)` iff the backend acknowledged the write.
    pub async fn schedule_event(&self, event: Event) -> Result<bool> {
        self.buffer_event(event.clone());
        self.write_remote(event).await
    }

    /// Snapshot of the local buffer, ordered by start time.
    pub fn buffered(&self) -> Vec<Event> {
        self.buffer.lock().clone()
    }

    /// Make `event` visible to [`Calendar::get_events`] until a remote read
    /// confirms it.
    pub fn buffer_event(&self, event: Event) {
        let mut buffer = self.buffer.lock();
        if !buffer.contains(&event) {
            buffer.push(event);
            sort_and_dedup(&mut buffer);
        }
    }

    /// Remote half of [`Calendar::schedule_event`]; the buffer is untouched.
    #[instrument(skip(self, event), fields(owner = %self.owner, title = %event.title))]
    pub async fn write_remote(&self, event: Event) -> Result<bool> {
        let accepted = self.backend.write_remote_event(&event).await?;
        if !accepted {
            warn!(start = %event.start, "backend declined event; keeping buffered copy");
        }
        Ok(accepted)
    }
}
