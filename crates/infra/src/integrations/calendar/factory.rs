//! Backend selection from stored calendar settings

use std::sync::Arc;

use async_trait::async_trait;
use rendezvous_core::{BackendFactory, CalendarBackend};
use rendezvous_domain::{CalendarSettings, Event, Result, TimeRange};
use tracing::debug;

use super::caldav::CalDavBackend;
use super::office_suite::OfficeSuiteBackend;
use super::remote_proxy::RemoteProxyBackend;
use crate::http::HttpClient;

/// One concrete backend per [`CalendarSettings`] variant.
pub enum CalendarBackendImpl {
    CalDav(CalDavBackend),
    OfficeSuite(OfficeSuiteBackend),
    RemoteProxy(RemoteProxyBackend),
}

#[async_trait]
impl CalendarBackend for CalendarBackendImpl {
    async fn fetch_remote_events(&self, range: TimeRange) -> Result<Vec<Event>> {
        match self {
            Self::CalDav(backend) => backend.fetch_remote_events(range).await,
            Self::OfficeSuite(backend) => backend.fetch_remote_events(range).await,
            Self::RemoteProxy(backend) => backend.fetch_remote_events(range).await,
        }
    }

    async fn write_remote_event(&self, event: &Event) -> Result<bool> {
        match self {
            Self::CalDav(backend) => backend.write_remote_event(event).await,
            Self::OfficeSuite(backend) => backend.write_remote_event(event).await,
            Self::RemoteProxy(backend) => backend.write_remote_event(event).await,
        }
    }
}

/// Build the backend described by `settings`. Every backend shares the
/// process-wide HTTP client.
pub fn create_backend(settings: &CalendarSettings, http: &HttpClient) -> CalendarBackendImpl {
    debug!(backend = settings.kind().as_str(), "creating calendar backend");
    let http = http.clone();
    match settings {
        CalendarSettings::CalDav { url, username, password } => CalendarBackendImpl::CalDav(
            CalDavBackend::new(http, url.as_str(), username.as_str(), password.as_str()),
        ),
        CalendarSettings::OfficeSuite { access_token, base_url, calendar_id } => {
            CalendarBackendImpl::OfficeSuite(OfficeSuiteBackend::new(
                http,
                access_token.as_str(),
                base_url.clone(),
                calendar_id.clone(),
            ))
        }
        CalendarSettings::RemoteProxy { url, token } => {
            CalendarBackendImpl::RemoteProxy(RemoteProxyBackend::new(http, url, token.clone()))
        }
    }
}

/// [`BackendFactory`] over real HTTP backends.
#[derive(Clone)]
pub struct HttpBackendFactory {
    http: HttpClient,
}

impl HttpBackendFactory {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl BackendFactory for HttpBackendFactory {
    fn create(&self, settings: &CalendarSettings) -> Result<Arc<dyn CalendarBackend>> {
        Ok(Arc::new(create_backend(settings, &self.http)))
    }
}
