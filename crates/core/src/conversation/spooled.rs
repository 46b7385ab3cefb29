//! Spool-backed conversations shared by all chat adapters

use std::sync::Arc;

use async_trait::async_trait;
use rendezvous_domain::{Conversant, Result};
use tracing::debug;

use super::ports::{Conversation, ReplySink};
use super::spool::{FireOutcome, Spool};

/// Spool keyed by conversant, carrying message text, creating
/// [`Conversation`] trait objects.
pub type ChatSpool = Spool<Conversant, String, Arc<dyn Conversation>>;

/// Conversation whose inbound side is the shared [`ChatSpool`] and whose
/// outbound side is a channel's [`ReplySink`].
pub struct SpooledConversation {
    conversant: Conversant,
    spool: Arc<ChatSpool>,
    sink: Arc<dyn ReplySink>,
}

impl SpooledConversation {
    pub fn new(conversant: Conversant, spool: Arc<ChatSpool>, sink: Arc<dyn ReplySink>) -> Self {
        Self { conversant, spool, sink }
    }
}

#[async_trait]
impl Conversation for SpooledConversation {
    fn conversant(&self) -> &Conversant {
        &self.conversant
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.sink.deliver(&self.conversant, text).await
    }

    async fn recv(&self) -> Result<String> {
        self.spool.wait(self.conversant.clone()).await
    }
}

/// Entry point for chat adapters: hand one inbound message to the spool.
pub fn route_inbound(
    spool: &Arc<ChatSpool>,
    sink: &Arc<dyn ReplySink>,
    conversant: Conversant,
    text: String,
) -> FireOutcome {
    debug!(%conversant, "inbound message");
    let conversation_spool = Arc::clone(spool);
    let conversation_sink = Arc::clone(sink);
    let key = conversant.clone();

    spool.fire(&key, text.clone(), text, move || -> Arc<dyn Conversation> {
        Arc::new(SpooledConversation::new(conversant, conversation_spool, conversation_sink))
    })
}
