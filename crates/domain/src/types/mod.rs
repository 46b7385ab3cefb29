//! Domain types and models

pub mod conversant;
pub mod event;
pub mod nlu;
pub mod settings;

pub use conversant::Conversant;
pub use event::{sort_and_dedup, Event, TimeRange};
pub use nlu::{Classification, Entity, Intent};
pub use settings::{BackendKind, CalendarSettings, UserSettings};
