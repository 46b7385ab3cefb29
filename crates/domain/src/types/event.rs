//! Calendar event and time range value types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RendezvousError, Result};

/// A calendar event.
///
/// Events are plain values: two events are the same event iff title, start
/// and end are all equal. Buffer reconciliation and deduplication rely on
/// this structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Event {
    /// Build an event, rejecting ranges where `end` precedes `start`.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(RendezvousError::InvalidInput(format!(
                "event ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { title: title.into(), start, end })
    }

    /// Build an event from a start time and a length.
    pub fn starting_at(
        title: impl Into<String>,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Self> {
        if duration <= Duration::zero() {
            return Err(RendezvousError::InvalidInput(format!(
                "meeting duration must be positive, got {} minutes",
                duration.num_minutes()
            )));
        }
        Self::new(title, start, start + duration)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the event intersects the half-open range `[range.start,
    /// range.end)`. Zero-length events count when they sit inside the range.
    pub fn overlaps(&self, range: &TimeRange) -> bool {
        if self.start == self.end {
            return range.start <= self.start && self.start < range.end;
        }
        self.start < range.end && self.end > range.start
    }
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(RendezvousError::InvalidInput(format!(
                "empty time range: {start} .. {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering `length` from `start`.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Result<Self> {
        Self::new(start, start + length)
    }
}

/// Sort events by start (then end, then title) and drop structural
/// duplicates.
pub fn sort_and_dedup(events: &mut Vec<Event>) {
    events.sort_by(|a, b| {
        a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)).then_with(|| a.title.cmp(&b.title))
    });
    events.dedup();
}
