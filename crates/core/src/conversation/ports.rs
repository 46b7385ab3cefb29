//! Conversation channel port interfaces
//!
//! One implementation per chat backend (Slack, Messenger, terminal, web).
//! Most adapters only provide a [`ReplySink`] and push inbound text through
//! [`crate::route_inbound`]; [`crate::SpooledConversation`] supplies the rest.

use async_trait::async_trait;
use rendezvous_domain::{Conversant, Result};

/// A dialogue's view of one chat conversation.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Who the bot is talking to.
    fn conversant(&self) -> &Conversant;

    /// Send one message to the conversant.
    async fn send(&self, text: &str) -> Result<()>;

    /// Suspend until the conversant's next message arrives.
    async fn recv(&self) -> Result<String>;
}

/// Outbound half of a chat backend.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, to: &Conversant, text: &str) -> Result<()>;
}
