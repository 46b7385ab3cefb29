//! HTTP server exposing one calendar backend over the proxy protocol
//!
//! `GET /events?start&end` lists events, `POST /events` writes one and
//! answers `{"accepted": bool}`. When a token is configured every request
//! must carry it as a bearer token.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rendezvous_core::CalendarBackend;
use rendezvous_domain::{Event, RendezvousError, TimeRange};
use tracing::{debug, instrument, warn};

use super::wire::{ErrorBody, EventsQuery, WriteAck, EVENTS_PATH};

#[derive(Clone)]
struct ProxyState {
    backend: Arc<dyn CalendarBackend>,
    token: Option<Arc<str>>,
}

impl ProxyState {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ProxyError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if presented.is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes())) {
            Ok(())
        } else {
            Err(ProxyError(RendezvousError::Auth("missing or invalid proxy token".into())))
        }
    }
}

/// Byte comparison whose running time does not depend on where the inputs
/// differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Router serving `backend` under [`EVENTS_PATH`].
pub fn router(backend: Arc<dyn CalendarBackend>, token: Option<String>) -> Router {
    let state = ProxyState { backend, token: token.map(Arc::from) };
    Router::new().route(EVENTS_PATH, get(list_events).post(write_event)).with_state(state)
}

#[instrument(skip_all)]
async fn list_events(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<Event>>, ProxyError> {
    state.authorize(&headers)?;
    let range = TimeRange::new(query.start, query.end)?;
    debug!(start = %range.start, end = %range.end, "listing events");
    Ok(Json(state.backend.fetch_remote_events(range).await?))
}

#[instrument(skip_all)]
async fn write_event(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    Json(event): Json<Event>,
) -> Result<Json<WriteAck>, ProxyError> {
    state.authorize(&headers)?;
    if event.end < event.start {
        return Err(RendezvousError::InvalidInput("event ends before it starts".into()).into());
    }
    let accepted = state.backend.write_remote_event(&event).await?;
    debug!(title = %event.title, accepted, "event written");
    Ok(Json(WriteAck { accepted }))
}

struct ProxyError(RendezvousError);

impl From<RendezvousError> for ProxyError {
    fn from(value: RendezvousError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RendezvousError::Auth(_) => StatusCode::UNAUTHORIZED,
            RendezvousError::Network(_) => StatusCode::BAD_GATEWAY,
            RendezvousError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(%status, error = %self.0, "proxy request failed");
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}
