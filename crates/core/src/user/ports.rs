//! Port interfaces for per-user settings
//!
//! These traits define the boundary between the dialogue logic and the
//! settings store implementation.

use async_trait::async_trait;
use rendezvous_domain::{Conversant, Result, UserSettings};

/// Record store for [`UserSettings`], keyed by conversant.
///
/// Concurrent writes for the same conversant are last-write-wins.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Settings for `who`, or `None` if nothing was ever stored.
    async fn get(&self, who: &Conversant) -> Result<Option<UserSettings>>;

    /// Insert or replace the settings for `who`.
    async fn put(&self, who: &Conversant, settings: UserSettings) -> Result<()>;
}
