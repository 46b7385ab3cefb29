//! Shared HTTP plumbing: the retrying client used by remote adapters and
//! the server loop used by the proxy and the web channel

pub mod client;
pub mod server;

pub use client::{HttpClient, HttpClientBuilder};
pub use server::{bind, serve};
