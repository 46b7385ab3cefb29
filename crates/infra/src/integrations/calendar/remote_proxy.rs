//! Calendar backend that talks to another Rendezvous instance's calendar
//! proxy (see [`crate::proxy`]).

use async_trait::async_trait;
use rendezvous_core::CalendarBackend;
use rendezvous_domain::{Event, Result, TimeRange};
use reqwest::{Method, RequestBuilder};
use tracing::{debug, instrument, warn};

use crate::errors::{into_domain, status_error};
use crate::http::HttpClient;
use crate::proxy::wire::{EventsQuery, WriteAck, EVENTS_PATH};

pub struct RemoteProxyBackend {
    http: HttpClient,
    events_url: String,
    token: Option<String>,
}

impl RemoteProxyBackend {
    pub fn new(http: HttpClient, url: &str, token: Option<String>) -> Self {
        let events_url = format!("{}{EVENTS_PATH}", url.trim_end_matches('/'));
        Self { http, events_url, token }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CalendarBackend for RemoteProxyBackend {
    #[instrument(skip(self), fields(url = %self.events_url))]
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        let query = EventsQuery { start: range.start, end: range.end };
        let request = self.authorize(self.http.request(Method::GET, &self.events_url).query(&query));

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "proxy refused event listing");
            return Err(status_error(status));
        }

        let events: Vec<Event> = response.json().await.map_err(into_domain)?;
        debug!(count = events.len(), "proxy returned events");
        Ok(events)
    }

    #[instrument(skip(self, event), fields(url = %self.events_url, title = %event.title))]
    async fn write_remote_event(&self, event: &Event) -> Result<bool> {
        let request = self.authorize(self.http.request(Method::POST, &self.events_url).json(event));

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "proxy refused event write");
            return Err(status_error(status));
        }

        let ack: WriteAck = response.json().await.map_err(into_domain)?;
        Ok(ack.accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::{DateTime, TimeZone, Utc};
    use rendezvous_domain::RendezvousError;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap()
    }

    fn backend(server: &MockServer, token: Option<&str>) -> RemoteProxyBackend {
        let http = HttpClient::builder()
            .max_attempts(1)
            .base_backoff(StdDuration::from_millis(1))
            .build()
            .unwrap();
        RemoteProxyBackend::new(http, &format!("{}/", server.uri()), token.map(String::from))
    }

    #[tokio::test]
    async fn lists_events_with_range_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(bearer_token("s3cret"))
            .and(query_param("start", "2026-05-04T08:00:00Z"))
            .and(query_param("end", "2026-05-04T18:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Standup", "start": "2026-05-04T09:00:00Z", "end": "2026-05-04T09:15:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let range = TimeRange::new(at(8), at(18)).unwrap();
        let events = backend(&server, Some("s3cret")).fetch_remote_events(range).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].start, at(9));
    }

    #[tokio::test]
    async fn write_reports_proxy_acknowledgement() {
        let server = MockServer::start().await;
        let event = Event::new("Sync", at(15), at(16)).unwrap();
        Mock::given(method("POST"))
            .and(path("/events"))
            .and(body_json(&event))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": false})))
            .mount(&server)
            .await;

        assert!(!backend(&server, None).write_remote_event(&event).await.unwrap());
    }

    #[tokio::test]
    async fn bad_gateway_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": "upstream"})))
            .mount(&server)
            .await;

        let range = TimeRange::new(at(8), at(18)).unwrap();
        let err = backend(&server, None).fetch_remote_events(range).await.unwrap_err();
        assert!(matches!(err, RendezvousError::Network(_)));
    }
}
