//! Calendar proxy
//!
//! Lets one instance serve a calendar backend to others over a small JSON
//! protocol; the client side is
//! [`crate::integrations::calendar::RemoteProxyBackend`].

pub mod server;
pub mod wire;

pub use server::router;
