//! CalDAV calendar backend
//!
//! Reads with a `REPORT` calendar-query restricted to the requested time
//! range; writes `PUT` a new `.ics` resource into the collection.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rendezvous_core::CalendarBackend;
use rendezvous_domain::{Event, RendezvousError, Result, TimeRange};
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::ical;
use crate::errors::{into_domain, status_error};
use crate::http::HttpClient;

static CALENDAR_DATA: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z0-9_-]+:)?calendar-data[^>]*>(.*?)</(?:[A-Za-z0-9_-]+:)?calendar-data>")
        .ok()
});

pub struct CalDavBackend {
    http: HttpClient,
    collection_url: String,
    username: String,
    password: String,
}

impl CalDavBackend {
    pub fn new(
        http: HttpClient,
        collection_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut collection_url = collection_url.into();
        if !collection_url.ends_with('/') {
            collection_url.push('/');
        }
        Self { http, collection_url, username: username.into(), password: password.into() }
    }

    fn calendar_query(range: &TimeRange) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop><C:calendar-data/></D:prop>
  <C:filter>
    <C:comp-filter name="VCALENDAR">
      <C:comp-filter name="VEVENT">
        <C:time-range start="{}" end="{}"/>
      </C:comp-filter>
    </C:comp-filter>
  </C:filter>
</C:calendar-query>"#,
            ical::format_utc(range.start),
            ical::format_utc(range.end),
        )
    }
}

#[async_trait]
impl CalendarBackend for CalDavBackend {
    #[instrument(skip(self), fields(collection = %self.collection_url))]
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        let report = Method::from_bytes(b"REPORT")
            .map_err(|e| RendezvousError::Internal(format!("REPORT method: {e}")))?;
        let request = self
            .http
            .request(report, &self.collection_url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(Self::calendar_query(&range));

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "calendar-query rejected");
            return Err(status_error(status));
        }

        let body = response.text().await.map_err(into_domain)?;
        let events = parse_multistatus(&body);
        debug!(count = events.len(), "calendar-query returned events");
        Ok(events.into_iter().filter(|event| event.overlaps(&range)).collect())
    }

    #[instrument(skip(self, event), fields(collection = %self.collection_url, title = %event.title))]
    async fn write_remote_event(&self, event: &Event) -> Result<bool> {
        let uid = Uuid::new_v4().to_string();
        let url = format!("{}{uid}.ics", self.collection_url);
        let request = self
            .http
            .request(Method::PUT, &url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .header("If-None-Match", "*")
            .body(ical::to_ics(event, &uid, Utc::now()));

        let status = self.http.send(request).await?.status();
        match status {
            s if s.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(status_error(status)),
            _ => {
                warn!(%status, "event PUT rejected");
                Ok(false)
            }
        }
    }
}

/// Events from every `calendar-data` element of a multistatus response.
fn parse_multistatus(xml: &str) -> Vec<Event> {
    let Some(pattern) = CALENDAR_DATA.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(xml)
        .filter_map(|captures| captures.get(1))
        .flat_map(|data| ical::parse_events(&unescape_xml(data.as_str())))
        .collect()
}

fn unescape_xml(text: &str) -> String {
    let text = text.trim();
    let text = text
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(text);
    text.replace("&#13;", "\r")
        .replace("&#xD;", "\r")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
