//! Conversant identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// A person talking to the bot.
///
/// The same user id in two namespaces (e.g. `slack` and `web`) denotes two
/// different people.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Conversant {
    pub namespace: String,
    pub user: String,
}

impl Conversant {
    pub fn new(namespace: impl Into<String>, user: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), user: user.into() }
    }

    /// Another user in the same namespace. Chat mentions such as `@bob` or
    /// `<@bob>` are reduced to the bare id.
    pub fn peer(&self, mention: &str) -> Self {
        let user = mention.trim().trim_start_matches('<').trim_end_matches('>').trim_start_matches('@');
        Self::new(self.namespace.clone(), user)
    }
}

impl fmt::Display for Conversant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.user)
    }
}
