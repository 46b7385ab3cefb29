//! Office-suite (Graph-style REST) calendar backend

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rendezvous_core::CalendarBackend;
use rendezvous_domain::{Event, Result, TimeRange};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::{into_domain, status_error};
use crate::http::HttpClient;

pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const OUTLOOK_TIMEZONE_HEADER: &str = r#"outlook.timezone="UTC""#;
const OUTLOOK_MAX_PAGE_SIZE_HEADER: &str = "odata.maxpagesize=50";
const MAX_PAGES: usize = 20;

pub struct OfficeSuiteBackend {
    http: HttpClient,
    access_token: String,
    base_url: String,
    calendar_id: Option<String>,
}

impl OfficeSuiteBackend {
    pub fn new(
        http: HttpClient,
        access_token: impl Into<String>,
        base_url: Option<String>,
        calendar_id: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            http,
            access_token: access_token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id,
        }
    }

    fn calendar_path(&self) -> String {
        match &self.calendar_id {
            Some(id) => format!("{}/me/calendars/{id}", self.base_url),
            None => format!("{}/me", self.base_url),
        }
    }

    async fn fetch_page(&self, request: reqwest::RequestBuilder) -> Result<EventsPage> {
        let response = self
            .http
            .send(
                request
                    .bearer_auth(&self.access_token)
                    .header("Prefer", OUTLOOK_TIMEZONE_HEADER)
                    .header("Prefer", OUTLOOK_MAX_PAGE_SIZE_HEADER),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, error = %error_text, "calendarView request failed");
            return Err(status_error(status));
        }

        response.json::<EventsPage>().await.map_err(into_domain)
    }
}

#[async_trait]
impl CalendarBackend for OfficeSuiteBackend {
    #[instrument(skip(self), fields(calendar = ?self.calendar_id))]
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        let url = format!("{}/calendarView", self.calendar_path());
        let mut request = self.http.request(Method::GET, &url).query(&[
            ("startDateTime", range.start.to_rfc3339()),
            ("endDateTime", range.end.to_rfc3339()),
        ]);

        let mut events = Vec::new();
        for page_number in 1..=MAX_PAGES {
            let page = self.fetch_page(request).await?;
            events.extend(page.value.into_iter().filter_map(GraphEvent::into_event));

            let Some(next) = page.next_link else {
                break;
            };
            if page_number == MAX_PAGES {
                warn!(pages = MAX_PAGES, "calendarView truncated at page limit");
                break;
            }
            request = self.http.request(Method::GET, next);
        }

        debug!(count = events.len(), "calendarView returned events");
        Ok(events.into_iter().filter(|event| event.overlaps(&range)).collect())
    }

    #[instrument(skip(self, event), fields(calendar = ?self.calendar_id, title = %event.title))]
    async fn write_remote_event(&self, event: &Event) -> Result<bool> {
        let url = format!("{}/events", self.calendar_path());
        let body = NewGraphEvent {
            subject: &event.title,
            start: GraphDateTime::utc(event.start),
            end: GraphDateTime::utc(event.end),
        };
        let request = self
            .http
            .request(Method::POST, &url)
            .bearer_auth(&self.access_token)
            .json(&body);

        let status = self.http.send(request).await?.status();
        match status {
            s if s.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(status_error(status)),
            _ => {
                warn!(%status, "event creation rejected");
                Ok(false)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    value: Vec<GraphEvent>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphEvent {
    subject: Option<String>,
    start: GraphDateTime,
    end: GraphDateTime,
}

impl GraphEvent {
    fn into_event(self) -> Option<Event> {
        let start = self.start.to_utc()?;
        let end = self.end.to_utc()?;
        let title = self.subject.unwrap_or_default();
        Event::new(title, start, end)
            .map_err(|err| warn!(error = %err, "skipping malformed event"))
            .ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone", default)]
    time_zone: Option<String>,
}

impl GraphDateTime {
    fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: instant.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: Some("UTC".to_string()),
        }
    }

    /// Naive `dateTime` read in `timeZone`; UTC when the zone is absent or
    /// not an IANA name.
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        let value = self.date_time.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            return Some(instant.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;

        match self.time_zone.as_deref() {
            None => Some(Utc.from_utc_datetime(&naive)),
            Some(zone) if zone.eq_ignore_ascii_case("utc") => Some(Utc.from_utc_datetime(&naive)),
            Some(zone) => match zone.parse::<Tz>() {
                Ok(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc)),
                Err(_) => {
                    warn!(zone, "unrecognised event time zone, reading as UTC");
                    Some(Utc.from_utc_datetime(&naive))
                }
            },
        }
    }
}

#[derive(Serialize)]
struct NewGraphEvent<'a> {
    subject: &'a str,
    start: GraphDateTime,
    end: GraphDateTime,
}
