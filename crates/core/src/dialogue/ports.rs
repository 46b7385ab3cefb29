//! NLU classifier port

use async_trait::async_trait;
use rendezvous_domain::{Classification, Result};

/// External intent/entity classifier.
#[async_trait]
pub trait NluClassifier: Send + Sync {
    /// Classify one user message. Fails with `Nlu` when the classifier is
    /// unreachable or answers with something unusable.
    async fn classify(&self, text: &str) -> Result<Classification>;
}
