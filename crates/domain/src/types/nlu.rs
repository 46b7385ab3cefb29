//! NLU classification results
//!
//! The classifier itself is an external collaborator; these types are the
//! narrow contract it is consumed through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::impl_label_conversions;

/// One extracted entity: the surface text plus an optional machine-readable
/// form (an RFC 3339 timestamp, `{"from", "to"}` interval, seconds, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub value: String,
    #[serde(default)]
    pub normalized: Option<serde_json::Value>,
}

impl Entity {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), normalized: None }
    }

    pub fn normalized(value: impl Into<String>, normalized: serde_json::Value) -> Self {
        Self { value: value.into(), normalized: Some(normalized) }
    }
}

/// Result of classifying one user message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub entities: BTreeMap<String, Entity>,
    #[serde(default)]
    pub greeting: bool,
    #[serde(default)]
    pub bye: bool,
    #[serde(default)]
    pub thanks: bool,
}

impl Classification {
    pub fn with_intent(intent: impl Into<String>) -> Self {
        Self { intent: Some(intent.into()), ..Self::default() }
    }

    pub fn entity(&self, tag: &str) -> Option<&Entity> {
        self.entities.get(tag)
    }

    /// Builder used by adapters and tests.
    #[must_use]
    pub fn and_entity(mut self, tag: impl Into<String>, entity: Entity) -> Self {
        self.entities.insert(tag.into(), entity);
        self
    }

    /// The intent parsed into the known set, if it is one.
    pub fn known_intent(&self) -> Option<Intent> {
        self.intent.as_deref().and_then(|name| name.parse().ok())
    }

    pub fn is_cancel(&self) -> bool {
        self.known_intent() == Some(Intent::Cancel)
    }
}

/// Intents the dialogue orchestrator routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    ShowCalendar,
    ScheduleMeeting,
    SetupCalendar,
    Who,
    Help,
    Cancel,
}

impl_label_conversions!(Intent {
    ShowCalendar => "show_calendar",
    ScheduleMeeting => "schedule_meeting",
    SetupCalendar => "setup_calendar",
    Who => "who",
    Help => "help",
    Cancel => "cancel",
});
