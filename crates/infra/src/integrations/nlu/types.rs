//! Wire format of the wit-style `/message` endpoint

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub intents: Vec<IntentCandidate>,
    /// Keyed `role` or `entity:role`, e.g. `wit$datetime:datetime`.
    #[serde(default)]
    pub entities: HashMap<String, Vec<EntityCandidate>>,
    /// Keyed by trait name, e.g. `wit$greetings`.
    #[serde(default)]
    pub traits: HashMap<String, Vec<TraitCandidate>>,
}

#[derive(Debug, Deserialize)]
pub struct IntentCandidate {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
pub struct EntityCandidate {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub from: Option<Bound>,
    #[serde(default)]
    pub to: Option<Bound>,
    #[serde(default)]
    pub normalized: Option<Normalized>,
}

#[derive(Debug, Deserialize)]
pub struct Bound {
    pub value: Value,
}

/// Duration entities carry their length converted to seconds here.
#[derive(Debug, Deserialize)]
pub struct Normalized {
    pub value: Value,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TraitCandidate {
    pub value: Value,
    #[serde(default)]
    pub confidence: f64,
}
