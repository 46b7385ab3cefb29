//! Calendar backend and settings mocks

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rendezvous_core::{BackendFactory, CalendarBackend, SettingsRepository};
use rendezvous_domain::{
    CalendarSettings, Conversant, Event, RendezvousError, Result, TimeRange, UserSettings,
};

/// Scriptable backend: accepts or declines every write, or fails with a
/// fixed error. Accepted writes become visible to later reads.
#[derive(Clone)]
pub struct MockBackend {
    remote: Arc<Mutex<Vec<Event>>>,
    writes: Arc<Mutex<Vec<Event>>>,
    accept: bool,
    failure: Option<RendezvousError>,
}

impl MockBackend {
    pub fn accepting() -> Self {
        Self {
            remote: Arc::default(),
            writes: Arc::default(),
            accept: true,
            failure: None,
        }
    }

    pub fn declining() -> Self {
        Self { accept: false, ..Self::accepting() }
    }

    pub fn failing(err: RendezvousError) -> Self {
        Self { failure: Some(err), ..Self::accepting() }
    }

    pub fn with_remote(self, events: Vec<Event>) -> Self {
        self.remote.lock().unwrap().extend(events);
        self
    }

    /// Every event a write was attempted for, accepted or not.
    pub fn writes(&self) -> Vec<Event> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarBackend for MockBackend {
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.remote.lock().unwrap().iter().filter(|e| e.overlaps(&range)).cloned().collect())
    }

    async fn write_remote_event(&self, event: &Event) -> Result<bool> {
        self.writes.lock().unwrap().push(event.clone());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if self.accept {
            self.remote.lock().unwrap().push(event.clone());
        }
        Ok(self.accept)
    }
}

/// Resolves `RemoteProxy { url: "mock://<name>" }` settings to registered
/// mock backends.
#[derive(Default)]
pub struct MockBackendFactory {
    backends: Mutex<HashMap<String, MockBackend>>,
}

impl MockBackendFactory {
    /// Register `backend` under `name` and return the settings that select it.
    pub fn register(&self, name: &str, backend: MockBackend) -> CalendarSettings {
        let url = format!("mock://{name}");
        self.backends.lock().unwrap().insert(url.clone(), backend);
        CalendarSettings::RemoteProxy { url, token: None }
    }
}

impl BackendFactory for MockBackendFactory {
    fn create(&self, settings: &CalendarSettings) -> Result<Arc<dyn CalendarBackend>> {
        let CalendarSettings::RemoteProxy { url, .. } = settings else {
            return Err(RendezvousError::Config("mock factory only builds mock:// backends".into()));
        };
        self.backends
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .map(|backend| Arc::new(backend) as Arc<dyn CalendarBackend>)
            .ok_or_else(|| RendezvousError::NotFound(url.clone()))
    }
}

/// Settings store backed by a `HashMap`.
#[derive(Default)]
pub struct InMemorySettings {
    records: Mutex<HashMap<Conversant, UserSettings>>,
}

impl InMemorySettings {
    pub fn with(self, who: &Conversant, settings: UserSettings) -> Self {
        self.records.lock().unwrap().insert(who.clone(), settings);
        self
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettings {
    async fn get(&self, who: &Conversant) -> Result<Option<UserSettings>> {
        Ok(self.records.lock().unwrap().get(who).cloned())
    }

    async fn put(&self, who: &Conversant, settings: UserSettings) -> Result<()> {
        self.records.lock().unwrap().insert(who.clone(), settings);
        Ok(())
    }
}
