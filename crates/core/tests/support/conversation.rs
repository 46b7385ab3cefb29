//! Conversation, reply sink and NLU mocks

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use rendezvous_core::{Conversation, NluClassifier, ReplySink};
use rendezvous_domain::{Classification, Conversant, RendezvousError, Result};

/// Conversation with a queue of canned user replies that records
/// everything the bot sends.
pub struct ScriptedConversation {
    conversant: Conversant,
    replies: Mutex<VecDeque<String>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedConversation {
    pub fn new(conversant: Conversant) -> Self {
        Self { conversant, replies: Mutex::default(), sent: Mutex::default() }
    }

    pub fn replying(self, replies: &[&str]) -> Self {
        self.replies.lock().unwrap().extend(replies.iter().map(|r| r.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> String {
        self.sent.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Conversation for ScriptedConversation {
    fn conversant(&self) -> &Conversant {
        &self.conversant
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn recv(&self) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RendezvousError::ChannelClosed("script exhausted".into()))
    }
}

/// Reply sink recording `(recipient, text)` pairs.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(Conversant, String)>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<(Conversant, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&self, to: &Conversant, text: &str) -> Result<()> {
        self.delivered.lock().unwrap().push((to.clone(), text.to_string()));
        Ok(())
    }
}

/// Classifier answering from a lookup table; unknown texts classify as
/// nothing at all.
#[derive(Default)]
pub struct ScriptedNlu {
    answers: Mutex<HashMap<String, Classification>>,
    broken: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNlu {
    pub fn on(self, text: &str, classification: Classification) -> Self {
        self.answers.lock().unwrap().insert(text.to_string(), classification);
        self
    }

    /// Classifying `text` fails with an NLU error.
    pub fn failing_on(self, text: &str) -> Self {
        self.broken.lock().unwrap().insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NluClassifier for ScriptedNlu {
    async fn classify(&self, text: &str) -> Result<Classification> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.broken.lock().unwrap().contains(text) {
            return Err(RendezvousError::Nlu("classifier unavailable".into()));
        }
        Ok(self.answers.lock().unwrap().get(text).cloned().unwrap_or_default())
    }
}
