//! Minimal iCalendar (RFC 5545) reading and writing
//!
//! Only what the CalDAV backend needs: `VEVENT` blocks with `SUMMARY`,
//! `DTSTART` and `DTEND`, in UTC, zoned (`TZID=`) or all-day form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rendezvous_domain::Event;
use tracing::warn;

const PRODID: &str = "-//Rendezvous//Calendar Bot//EN";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Render `event` as a single-event `VCALENDAR` document.
pub fn to_ics(event: &Event, uid: &str, stamp: DateTime<Utc>) -> String {
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{}", format_utc(stamp)),
        format!("DTSTART:{}", format_utc(event.start)),
        format!("DTEND:{}", format_utc(event.end)),
        format!("SUMMARY:{}", escape_text(&event.title)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    let mut ics = lines.join("\r\n");
    ics.push_str("\r\n");
    ics
}

pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}

/// Every well-formed `VEVENT` in `ics`. Events without a parseable start are
/// skipped; a missing `DTEND` yields a zero-length event.
pub fn parse_events(ics: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current: Option<VEventFields> = None;

    for line in unfold(ics) {
        let Some((name, params, value)) = split_property(&line) else {
            continue;
        };

        match name.as_str() {
            "BEGIN" if value.eq_ignore_ascii_case("VEVENT") => {
                current = Some(VEventFields::default());
            }
            "END" if value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(event) = current.take().and_then(VEventFields::into_event) {
                    events.push(event);
                }
            }
            _ => {
                if let Some(fields) = current.as_mut() {
                    fields.set(&name, params, value);
                }
            }
        }
    }

    events
}

#[derive(Default)]
struct VEventFields {
    summary: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl VEventFields {
    fn set(&mut self, name: &str, params: &str, value: &str) {
        match name {
            "SUMMARY" => self.summary = Some(unescape_text(value)),
            "DTSTART" => self.start = parse_datetime(params, value),
            "DTEND" => self.end = parse_datetime(params, value),
            _ => {}
        }
    }

    fn into_event(self) -> Option<Event> {
        let start = self.start?;
        let end = self.end.unwrap_or(start);
        let title = self.summary.unwrap_or_default();
        match Event::new(title, start, end) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "skipping malformed VEVENT");
                None
            }
        }
    }
}

/// Join folded continuation lines (RFC 5545 §3.1).
fn unfold(ics: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in ics.lines() {
        let raw = raw.trim_end_matches('\r');
        match (raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')), lines.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

/// `NAME;PARAM=x:VALUE` → (upper-cased name, params, value).
fn split_property(line: &str) -> Option<(String, &str, &str)> {
    let (head, value) = line.split_once(':')?;
    let (name, params) = head.split_once(';').unwrap_or((head, ""));
    Some((name.trim().to_ascii_uppercase(), params, value.trim()))
}

fn parse_datetime(params: &str, value: &str) -> Option<DateTime<Utc>> {
    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    if params.to_ascii_uppercase().contains("VALUE=DATE") || value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    let zone = params
        .split(';')
        .find_map(|param| param.strip_prefix("TZID="))
        .and_then(|name| name.trim_matches('"').parse::<Tz>().ok());

    match zone {
        Some(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc)),
        // Floating time; read as UTC.
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
