//! Web chat channel
//!
//! `POST /chat/messages` with `{"user", "text"}` hands a message to the
//! spool; replies queue per user until fetched with
//! `GET /chat/messages/{user}`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use rendezvous_core::{route_inbound, ChatSpool, FireOutcome, ReplySink};
use rendezvous_domain::constants::NAMESPACE_WEB;
use rendezvous_domain::{Conversant, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Replies waiting to be fetched, per conversant.
#[derive(Default)]
pub struct Outbox {
    pending: Mutex<HashMap<Conversant, Vec<String>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything queued for `who`.
    pub fn drain(&self, who: &Conversant) -> Vec<String> {
        self.pending.lock().remove(who).unwrap_or_default()
    }
}

#[async_trait]
impl ReplySink for Outbox {
    async fn deliver(&self, to: &Conversant, text: &str) -> Result<()> {
        self.pending.lock().entry(to.clone()).or_default().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InboundStatus {
    /// A new conversation was started.
    Started,
    /// A waiting conversation received the message.
    Delivered,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InboundAck {
    pub status: InboundStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutboundMessages {
    pub messages: Vec<String>,
}

#[derive(Clone)]
struct WebState {
    spool: Arc<ChatSpool>,
    outbox: Arc<Outbox>,
}

pub fn router(spool: Arc<ChatSpool>, outbox: Arc<Outbox>) -> Router {
    Router::new()
        .route("/chat/messages", post(receive))
        .route("/chat/messages/{user}", get(fetch))
        .with_state(WebState { spool, outbox })
}

#[instrument(skip_all)]
async fn receive(
    State(state): State<WebState>,
    Json(message): Json<InboundMessage>,
) -> (StatusCode, Json<InboundAck>) {
    let who = Conversant::new(NAMESPACE_WEB, message.user);
    let sink: Arc<dyn ReplySink> = state.outbox.clone();
    let status = match route_inbound(&state.spool, &sink, who, message.text) {
        FireOutcome::Handled => InboundStatus::Delivered,
        // The spawned dialogue runs detached from the request.
        FireOutcome::New(_) => InboundStatus::Started,
    };
    debug!(?status, "web message accepted");
    (StatusCode::ACCEPTED, Json(InboundAck { status }))
}

async fn fetch(State(state): State<WebState>, Path(user): Path<String>) -> Json<OutboundMessages> {
    let messages = state.outbox.drain(&Conversant::new(NAMESPACE_WEB, user));
    Json(OutboundMessages { messages })
}
