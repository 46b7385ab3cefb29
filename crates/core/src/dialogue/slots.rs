//! Slot extraction from NLU entities
//!
//! A [`Slot`] names the entity tag it reads and how to turn the entity into
//! a typed value. Normalized values win over surface text.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use rendezvous_domain::constants::{
    MAX_MEETING_DURATION_MINUTES, SLOT_CONTACT, SLOT_DATETIME, SLOT_DURATION, SLOT_SUBJECT,
};
use rendezvous_domain::{Classification, Entity, TimeRange};
use serde_json::Value;

/// A named piece of information a dialogue needs.
pub struct Slot<T> {
    pub name: &'static str,
    extract: fn(&Entity) -> Option<T>,
}

impl<T> Slot<T> {
    pub const fn new(name: &'static str, extract: fn(&Entity) -> Option<T>) -> Self {
        Self { name, extract }
    }

    /// The slot's value in `classification`, if present and well-formed.
    pub fn extract(&self, classification: &Classification) -> Option<T> {
        classification.entity(self.name).and_then(self.extract)
    }
}

/// Counterpart user id or mention.
pub const CONTACT: Slot<String> = Slot::new(SLOT_CONTACT, parse_text);
/// Meeting start.
pub const START: Slot<DateTime<Utc>> = Slot::new(SLOT_DATETIME, parse_instant);
/// Meeting length.
pub const DURATION: Slot<Duration> = Slot::new(SLOT_DURATION, parse_duration);
/// Optional meeting title.
pub const SUBJECT: Slot<String> = Slot::new(SLOT_SUBJECT, parse_text);

static DURATION_TEXT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*(m|mins?|minutes?|h|hrs?|hours?)?\s*$").ok()
});

fn parse_text(entity: &Entity) -> Option<String> {
    let value = entity.value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

fn parse_instant(entity: &Entity) -> Option<DateTime<Utc>> {
    match &entity.normalized {
        Some(Value::String(text)) => parse_rfc3339(text),
        Some(Value::Object(map)) => map
            .get("value")
            .or_else(|| map.get("from"))
            .and_then(Value::as_str)
            .and_then(parse_rfc3339),
        _ => parse_rfc3339(&entity.value),
    }
}

fn parse_duration(entity: &Entity) -> Option<Duration> {
    let seconds = match &entity.normalized {
        Some(Value::Number(seconds)) => {
            seconds.as_i64().or_else(|| seconds.as_f64().and_then(whole_seconds))
        }
        Some(Value::Object(map)) => {
            let amount = map.get("value").and_then(Value::as_i64);
            let unit = map.get("unit").and_then(Value::as_str).unwrap_or("second");
            amount.and_then(|n| seconds_in_unit(n, unit))
        }
        _ => parse_duration_text(&entity.value),
    }?;

    // Bounded before building the Duration; chrono panics past its range.
    (1..=MAX_MEETING_DURATION_MINUTES * 60).contains(&seconds).then(|| Duration::seconds(seconds))
}

fn whole_seconds(seconds: f64) -> Option<i64> {
    let rounded = seconds.round();
    (rounded.is_finite() && rounded.abs() < i64::MAX as f64).then_some(rounded as i64)
}

fn parse_duration_text(text: &str) -> Option<i64> {
    let captures = DURATION_TEXT.as_ref()?.captures(text)?;
    let amount: i64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2).map_or("minute", |m| m.as_str());
    seconds_in_unit(amount, unit)
}

fn seconds_in_unit(amount: i64, unit: &str) -> Option<i64> {
    let scale = match unit.to_ascii_lowercase().trim_end_matches('s') {
        "second" | "sec" => 1,
        "m" | "min" | "minute" => 60,
        "h" | "hr" | "hour" => 3600,
        _ => return None,
    };
    amount.checked_mul(scale)
}

/// Range a "show my calendar" request refers to.
///
/// An explicit `{"from", "to"}` interval is used as is; a single instant
/// selects its whole day in `tz`; no datetime selects today in `tz`.
pub fn requested_range(classification: &Classification, tz: Tz, now: DateTime<Utc>) -> TimeRange {
    let entity = classification.entity(SLOT_DATETIME);

    if let Some(Value::Object(map)) = entity.and_then(|e| e.normalized.as_ref()) {
        let bound = |key: &str| map.get(key).and_then(Value::as_str).and_then(parse_rfc3339);
        if let (Some(from), Some(to)) = (bound("from"), bound("to")) {
            if let Ok(range) = TimeRange::new(from, to) {
                return range;
            }
        }
    }

    let anchor = entity.and_then(parse_instant).unwrap_or(now);
    day_containing(anchor, tz)
}

/// Local calendar day of `instant` in `tz`, as a UTC range.
pub fn day_containing(instant: DateTime<Utc>, tz: Tz) -> TimeRange {
    let local_midnight = instant.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
    let start = tz
        .from_local_datetime(&local_midnight)
        .earliest()
        .map_or(instant, |dt| dt.with_timezone(&Utc));
    TimeRange { start, end: start + Duration::days(1) }
}
