//! Chat conversations and inbound message dispatch

pub mod ports;
pub mod spool;
pub mod spooled;

pub use ports::{Conversation, ReplySink};
pub use spool::{Dispatch, FireOutcome, NewConversationHandler, Spool};
pub use spooled::{route_inbound, ChatSpool, SpooledConversation};
