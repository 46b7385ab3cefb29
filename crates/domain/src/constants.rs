//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Conversation namespaces (one per chat backend)
pub const NAMESPACE_SLACK: &str = "slack";
pub const NAMESPACE_MESSENGER: &str = "messenger";
pub const NAMESPACE_TERMINAL: &str = "terminal";
pub const NAMESPACE_WEB: &str = "web";

// Slot names used by the NLU entity map
pub const SLOT_CONTACT: &str = "contact";
pub const SLOT_DATETIME: &str = "datetime";
pub const SLOT_DURATION: &str = "duration";
pub const SLOT_SUBJECT: &str = "subject";

// Scheduling defaults
pub const DEFAULT_MEETING_TITLE: &str = "Meeting";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const MAX_MEETING_DURATION_MINUTES: i64 = 24 * 60;

// Calendar listing
pub const MAX_LISTED_EVENTS: usize = 20;
