//! Natural-language classification
//!
//! [`WitClient`] implements [`rendezvous_core::NluClassifier`] over a
//! wit-style HTTP API: the best-scoring intent, one entity per role and the
//! greeting, bye and thanks traits.

pub mod client;
pub mod types;

pub use client::WitClient;
