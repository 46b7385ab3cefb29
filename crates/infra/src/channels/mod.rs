//! Chat channels
//!
//! Each channel owns a [`rendezvous_core::ReplySink`] and pushes inbound
//! text through [`rendezvous_core::route_inbound`].

pub mod terminal;
pub mod web;

pub use terminal::{TerminalChannel, WriterSink};
pub use web::Outbox;
