//! SQLite-backed settings repository
//!
//! One row per `(namespace, user_id)`; the settings record itself is stored
//! as JSON so new optional fields need no migration.

use std::sync::Arc;

use async_trait::async_trait;
use rendezvous_core::user::ports::SettingsRepository as SettingsRepositoryPort;
use rendezvous_domain::{Conversant, Result as DomainResult, UserSettings};
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::into_domain;

pub struct SqliteSettingsRepository {
    db: Arc<DbManager>,
}

impl SqliteSettingsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepositoryPort for SqliteSettingsRepository {
    #[instrument(skip(self), fields(conversant = %who))]
    async fn get(&self, who: &Conversant) -> DomainResult<Option<UserSettings>> {
        let db = Arc::clone(&self.db);
        let who = who.clone();

        task::spawn_blocking(move || -> DomainResult<Option<UserSettings>> {
            let conn = db.get_connection()?;
            let raw: Option<String> = conn
                .query_row(
                    "SELECT settings_json FROM user_settings WHERE namespace = ?1 AND user_id = ?2",
                    params![who.namespace, who.user],
                    |row| row.get(0),
                )
                .optional()
                .map_err(into_domain)?;

            raw.map(|json| serde_json::from_str(&json).map_err(into_domain)).transpose()
        })
        .await
        .map_err(into_domain)?
    }

    #[instrument(skip(self, settings), fields(conversant = %who))]
    async fn put(&self, who: &Conversant, settings: UserSettings) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let who = who.clone();
        let json = serde_json::to_string(&settings).map_err(into_domain)?;

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO user_settings (namespace, user_id, settings_json, updated_at)
                 VALUES (?1, ?2, ?3, CAST(strftime('%s','now') AS INTEGER))
                 ON CONFLICT (namespace, user_id) DO UPDATE SET
                     settings_json = excluded.settings_json,
                     updated_at = excluded.updated_at",
                params![who.namespace, who.user, json],
            )
            .map_err(into_domain)?;
            debug!("settings stored");
            Ok(())
        })
        .await
        .map_err(into_domain)?
    }
}

#[cfg(test)]
mod tests {
    use rendezvous_domain::CalendarSettings;
    use tempfile::TempDir;

    use super::*;

    fn repository() -> (SqliteSettingsRepository, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = DbManager::new(temp_dir.path().join("settings.db"), 2).expect("manager");
        manager.run_migrations().expect("migrations");
        (SqliteSettingsRepository::new(Arc::new(manager)), temp_dir)
    }

    fn proxy(url: &str) -> UserSettings {
        UserSettings::with_calendar(CalendarSettings::RemoteProxy { url: url.into(), token: None })
    }

    #[tokio::test]
    async fn unknown_conversant_has_no_settings() {
        let (repo, _dir) = repository();
        assert_eq!(repo.get(&Conversant::new("slack", "nobody")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_returns_stored_settings() {
        let (repo, _dir) = repository();
        let alice = Conversant::new("slack", "alice");
        let settings = UserSettings {
            timezone: Some("Europe/Paris".into()),
            display_name: Some("Alice".into()),
            ..proxy("http://proxy.local")
        };

        repo.put(&alice, settings.clone()).await.unwrap();

        assert_eq!(repo.get(&alice).await.unwrap(), Some(settings));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let (repo, _dir) = repository();
        let alice = Conversant::new("slack", "alice");

        repo.put(&alice, proxy("http://first")).await.unwrap();
        repo.put(&alice, proxy("http://second")).await.unwrap();

        assert_eq!(repo.get(&alice).await.unwrap(), Some(proxy("http://second")));
    }

    #[tokio::test]
    async fn namespaces_are_separate_records() {
        let (repo, _dir) = repository();
        repo.put(&Conversant::new("slack", "u1"), proxy("http://slack")).await.unwrap();

        assert_eq!(repo.get(&Conversant::new("web", "u1")).await.unwrap(), None);
    }
}
