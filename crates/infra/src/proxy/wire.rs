//! JSON shapes shared by the proxy server and the remote-proxy backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EVENTS_PATH: &str = "/events";

/// Query string of `GET /events`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventsQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Body of the `POST /events` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    pub accepted: bool,
}

/// Body of every non-2xx proxy response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
