//! # Rendezvous Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for calendar backends, chat
//!   conversations, the NLU classifier and the settings store
//! - The buffered [`Calendar`] and the speculative scheduling transaction
//! - The [`Spool`] that routes inbound messages to waiting dialogues
//! - The dialogue orchestrator ([`Assistant`])
//!
//! ## Architecture Principles
//! - Only depends on `rendezvous-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod calendar;
pub mod conversation;
pub mod dialogue;
pub mod scheduling;
pub mod user;

pub use calendar::ports::{BackendFactory, CalendarBackend};
pub use calendar::Calendar;
pub use conversation::ports::{Conversation, ReplySink};
pub use conversation::spool::{Dispatch, FireOutcome, NewConversationHandler, Spool};
pub use conversation::spooled::{route_inbound, ChatSpool, SpooledConversation};
pub use dialogue::ports::NluClassifier;
pub use dialogue::query_loop::{query_loop, SlotOutcome};
pub use dialogue::{Assistant, Route};
pub use scheduling::{run_speculative, ResultHandle, Speculation, TransactionWorld};
pub use user::ports::SettingsRepository;
