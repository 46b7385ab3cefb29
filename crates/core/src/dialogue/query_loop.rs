//! Ask-until-answered slot filling

use rendezvous_domain::Result;
use tracing::{debug, warn};

use super::ports::NluClassifier;
use super::replies;
use super::slots::Slot;
use crate::conversation::Conversation;

/// How a slot-filling exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome<T> {
    Filled(T),
    /// The user said "cancel". The acknowledgement has already been sent.
    Cancelled,
}

/// Obtain a value for `slot`.
///
/// An `initial` value (usually taken from the message that started the
/// dialogue) is returned without prompting. Otherwise `prompt` is sent and
/// each reply is classified until one carries the slot or is a cancel.
/// Replies that fail to classify are reported to the user and the prompt is
/// repeated.
///
/// Fails only when the conversation itself does.
pub async fn query_loop<T>(
    conversation: &dyn Conversation,
    nlu: &dyn NluClassifier,
    initial: Option<T>,
    prompt: &str,
    slot: &Slot<T>,
) -> Result<SlotOutcome<T>> {
    if let Some(value) = initial {
        return Ok(SlotOutcome::Filled(value));
    }

    let conversant = conversation.conversant();
    loop {
        conversation.send(prompt).await?;
        let reply = conversation.recv().await?;

        let classification = match nlu.classify(&reply).await {
            Ok(classification) => classification,
            Err(err) => {
                warn!(%conversant, slot = slot.name, error = %err, "could not classify reply");
                conversation.send(replies::NOT_UNDERSTOOD).await?;
                continue;
            }
        };

        if classification.is_cancel() {
            debug!(%conversant, slot = slot.name, "slot filling cancelled");
            conversation.send(replies::CANCELLED).await?;
            return Ok(SlotOutcome::Cancelled);
        }

        match slot.extract(&classification) {
            Some(value) => {
                debug!(%conversant, slot = slot.name, "slot filled");
                return Ok(SlotOutcome::Filled(value));
            }
            None => debug!(%conversant, slot = slot.name, "reply did not fill slot"),
        }
    }
}
