//! Message-to-waiter dispatch
//!
//! A [`Spool`] holds the dialogues currently suspended in `recv()`. Each
//! inbound message either resumes the oldest dialogue waiting on its key or,
//! when nobody is waiting, starts a new dialogue through the registered
//! [`NewConversationHandler`].

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rendezvous_domain::{RendezvousError, Result};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Starts a dialogue for a message nobody was waiting for.
#[async_trait]
pub trait NewConversationHandler<C>: Send + Sync {
    async fn on_new_conversation(&self, text: String, conversation: C);
}

/// Result of [`Spool::dispatch`].
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<M> {
    Delivered,
    /// No waiter for the key; the message is handed back.
    Unmatched(M),
}

/// Result of [`Spool::fire`].
#[derive(Debug)]
pub enum FireOutcome {
    /// A waiting dialogue received the message.
    Handled,
    /// A new dialogue was started; the handle completes when its handler
    /// returns.
    New(JoinHandle<()>),
}

impl FireOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}

struct Waiter<K, M> {
    key: K,
    resolve: oneshot::Sender<M>,
}

/// Waiter registry plus the new-conversation handler.
///
/// The waiter list is only locked for non-suspending bookkeeping, so
/// delivery order is exactly registration order per key.
pub struct Spool<K, M, C> {
    waiters: Mutex<Vec<Waiter<K, M>>>,
    handler: Arc<dyn NewConversationHandler<C>>,
}

impl<K, M, C> Spool<K, M, C>
where
    K: PartialEq + Debug + Send + 'static,
    M: Send + 'static,
    C: Send + 'static,
{
    pub fn new(handler: Arc<dyn NewConversationHandler<C>>) -> Self {
        Self { waiters: Mutex::new(Vec::new()), handler }
    }

    /// Register a waiter for `key` and return a future resolving with the
    /// next message dispatched to it.
    ///
    /// Registration happens immediately, before the future is polled. The
    /// future fails with `ChannelClosed` if the spool is dropped first.
    pub fn wait(&self, key: K) -> impl Future<Output = Result<M>> + Send + 'static {
        let (resolve, receiver) = oneshot::channel();
        trace!(?key, "registering waiter");
        self.waiters.lock().push(Waiter { key, resolve });

        async move {
            receiver
                .await
                .map_err(|_| RendezvousError::ChannelClosed("spool shut down".into()))
        }
    }

    /// Deliver `message` to the oldest waiter registered under `key`.
    ///
    /// Waiters whose dialogue has gone away are discarded and the next one
    /// is tried.
    pub fn dispatch(&self, key: &K, message: M) -> Dispatch<M> {
        let mut message = message;
        loop {
            let waiter = {
                let mut waiters = self.waiters.lock();
                match waiters.iter().position(|waiter| &waiter.key == key) {
                    Some(idx) => waiters.remove(idx),
                    None => return Dispatch::Unmatched(message),
                }
            };

            match waiter.resolve.send(message) {
                Ok(()) => return Dispatch::Delivered,
                Err(returned) => {
                    debug!(?key, "dropping abandoned waiter");
                    message = returned;
                }
            }
        }
    }

    /// Resume a waiting dialogue with `message`, or start a new one.
    ///
    /// When nobody waits on `key`, `mk_conversation` is called once and the
    /// handler is spawned with `text` and the new conversation.
    pub fn fire<F>(&self, key: &K, message: M, text: String, mk_conversation: F) -> FireOutcome
    where
        F: FnOnce() -> C,
    {
        match self.dispatch(key, message) {
            Dispatch::Delivered => FireOutcome::Handled,
            Dispatch::Unmatched(_) => {
                debug!(?key, "no waiter; starting new conversation");
                let conversation = mk_conversation();
                let handler = Arc::clone(&self.handler);
                FireOutcome::New(tokio::spawn(async move {
                    handler.on_new_conversation(text, conversation).await;
                }))
            }
        }
    }

    /// Number of registered waiters, live or abandoned.
    pub fn pending(&self) -> usize {
        self.waiters.lock().len()
    }
}
