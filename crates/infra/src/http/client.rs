use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use rendezvous_domain::{HttpConfig, RendezvousError};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Longest `Retry-After` a calendar or NLU service can make us wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Shared reqwest client that retries transient failures.
///
/// Transport errors, 5xx and 429 responses are retried with exponential
/// backoff; a `Retry-After` in seconds replaces the backoff when present.
/// When attempts run out the last response is returned as is, so callers
/// still map its status themselves.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

enum Attempt {
    Done(Response),
    Retry(Duration),
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn new() -> Result<Self, RendezvousError> {
        Self::builder().build()
    }

    /// Client honouring the `[http]` configuration section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, RendezvousError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .max_attempts(config.max_attempts)
            .base_backoff(Duration::from_millis(config.base_backoff_ms))
            .user_agent(concat!("rendezvous/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transient failures.
    ///
    /// # Errors
    /// `Network` when the last attempt failed in transport, `Internal` when
    /// the request body is a stream that cannot be replayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, RendezvousError> {
        let mut attempt = 1;
        loop {
            let last = attempt >= self.max_attempts;
            let request = builder.try_clone().ok_or_else(|| {
                RendezvousError::Internal("streaming request bodies cannot be retried".into())
            })?;

            match self.attempt(request, attempt, last).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retry(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: RequestBuilder,
        attempt: usize,
        last: bool,
    ) -> Result<Attempt, RendezvousError> {
        let request = request.build().map_err(|e| RendezvousError::from(InfraError::from(e)))?;
        let (method, url) = (request.method().clone(), request.url().clone());

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(attempt, %method, %url, %status, "http response");
                if last || !is_transient(status) {
                    return Ok(Attempt::Done(response));
                }
                let delay = retry_after(&response).unwrap_or_else(|| self.backoff(attempt));
                warn!(attempt, %url, %status, ?delay, "transient http status, retrying");
                Ok(Attempt::Retry(delay))
            }
            Err(err) if !last && (err.is_connect() || err.is_timeout() || err.is_request()) => {
                warn!(attempt, %url, error = %err, "http request failed, retrying");
                Ok(Attempt::Retry(self.backoff(attempt)))
            }
            Err(err) => Err(RendezvousError::from(InfraError::from(err))),
        }
    }

    /// Delay after the `attempt`-th try: `base * 2^(attempt - 1)`, capped.
    fn backoff(&self, attempt: usize) -> Duration {
        let doublings = attempt.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1 << doublings)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn retry_after(response: &Response) -> Option<Duration> {
    let seconds: u64 = response.headers().get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
}

#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total tries including the first; at least one.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, RendezvousError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|e| RendezvousError::from(InfraError::from(e)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}
