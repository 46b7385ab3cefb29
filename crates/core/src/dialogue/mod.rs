//! Dialogue orchestration
//!
//! Every new conversation is classified once, routed to a handler, and
//! returns to idle when the handler finishes. Handlers that need more
//! information suspend in [`query_loop`] until the user supplies it.

pub mod ports;
pub mod query_loop;
pub mod replies;
pub mod route;
pub mod service;
pub mod slots;

pub use ports::NluClassifier;
pub use query_loop::{query_loop, SlotOutcome};
pub use route::Route;
pub use service::{Assistant, Clock};
pub use slots::Slot;
