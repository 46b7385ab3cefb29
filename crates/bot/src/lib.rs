//! Rendezvous chat bot
//!
//! Wires the settings store, NLU client, calendar backends and chat
//! channels into one [`AppContext`].

pub mod context;

pub use context::AppContext;
