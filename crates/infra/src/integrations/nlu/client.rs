//! Wit-style NLU client

use std::collections::HashMap;

use async_trait::async_trait;
use rendezvous_core::NluClassifier;
use rendezvous_domain::{Classification, Entity, NluConfig, RendezvousError, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::types::{EntityCandidate, MessageResponse, TraitCandidate};
use crate::http::HttpClient;

const API_VERSION: &str = "20240304";
const TRAIT_GREETINGS: &str = "wit$greetings";
const TRAIT_BYE: &str = "wit$bye";
const TRAIT_THANKS: &str = "wit$thanks";
/// Traits below this confidence are ignored.
const TRAIT_MIN_CONFIDENCE: f64 = 0.5;

/// Classifies chat messages through a wit-style `GET /message?q=` endpoint.
pub struct WitClient {
    http: HttpClient,
    endpoint: String,
    token: Option<String>,
}

impl WitClient {
    pub fn new(http: HttpClient, endpoint: impl Into<String>, token: Option<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { http, endpoint, token }
    }

    pub fn from_config(http: HttpClient, config: &NluConfig) -> Self {
        Self::new(http, config.endpoint.as_str(), config.token.clone())
    }

    async fn call_api(&self, text: &str) -> Result<MessageResponse> {
        let url = format!("{}/message", self.endpoint);
        let mut request =
            self.http.request(Method::GET, &url).query(&[("v", API_VERSION), ("q", text)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = self.http.send(request).await.map_err(|e| nlu_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RendezvousError::Nlu(format!("classifier returned {status}: {error_text}")));
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| RendezvousError::Nlu(format!("unreadable classifier response: {e}")))
    }
}

#[async_trait]
impl NluClassifier for WitClient {
    #[instrument(skip_all, fields(len = text.len()))]
    async fn classify(&self, text: &str) -> Result<Classification> {
        let response = self.call_api(text).await.inspect_err(|err| {
            warn!(error = %err, "classification request failed");
        })?;
        let classification = to_classification(response);
        debug!(
            intent = ?classification.intent,
            entities = ?classification.entities.keys().collect::<Vec<_>>(),
            "message classified"
        );
        Ok(classification)
    }
}

fn nlu_error(err: &RendezvousError) -> RendezvousError {
    RendezvousError::Nlu(err.to_string())
}

fn to_classification(response: MessageResponse) -> Classification {
    let intent = response
        .intents
        .into_iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|candidate| candidate.name);

    let mut classification = Classification {
        intent,
        greeting: trait_set(&response.traits, TRAIT_GREETINGS),
        bye: trait_set(&response.traits, TRAIT_BYE),
        thanks: trait_set(&response.traits, TRAIT_THANKS),
        ..Classification::default()
    };

    for (key, candidates) in response.entities {
        let tag = key.rsplit(':').next().unwrap_or(&key).to_string();
        let best = candidates.into_iter().max_by(|a, b| a.confidence.total_cmp(&b.confidence));
        if let Some(candidate) = best {
            classification = classification.and_entity(tag, to_entity(candidate));
        }
    }

    classification
}

/// Surface text plus the machine-readable form the dialogue slots parse:
/// a timestamp string, a `{"from", "to"}` interval, or a number of seconds.
fn to_entity(candidate: EntityCandidate) -> Entity {
    let normalized = match candidate.kind.as_deref() {
        Some("interval") => {
            let from = candidate.from.map(|bound| bound.value);
            let to = candidate.to.map(|bound| bound.value);
            Some(json!({ "from": from, "to": to }))
        }
        _ => match candidate.normalized {
            Some(normalized) if normalized.unit.as_deref().map_or(true, |u| u == "second") => {
                Some(normalized.value)
            }
            Some(normalized) => Some(json!({ "value": normalized.value, "unit": normalized.unit })),
            None => candidate.value.filter(|value| !value.is_null()),
        },
    };

    let value = match (&candidate.body, &normalized) {
        (body, _) if !body.trim().is_empty() => body.clone(),
        (_, Some(Value::String(text))) => text.clone(),
        _ => String::new(),
    };
    Entity { value, normalized }
}

fn trait_set(traits: &HashMap<String, Vec<TraitCandidate>>, name: &str) -> bool {
    traits.get(name).is_some_and(|candidates| {
        candidates.iter().any(|candidate| {
            candidate.confidence >= TRAIT_MIN_CONFIDENCE
                && match &candidate.value {
                    Value::Bool(flag) => *flag,
                    Value::String(text) => text.eq_ignore_ascii_case("true"),
                    _ => false,
                }
        })
    })
}
