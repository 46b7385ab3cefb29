//! Application context - dependency wiring and channel supervision

use std::sync::Arc;

use rendezvous_core::{
    Assistant, BackendFactory, ChatSpool, NluClassifier, ReplySink, SettingsRepository,
};
use rendezvous_domain::{Config, RendezvousError, Result};
use rendezvous_infra::channels::web;
use rendezvous_infra::http::{bind, serve};
use rendezvous_infra::{
    create_backend, proxy, DbManager, HttpBackendFactory, HttpClient, Outbox,
    SqliteSettingsRepository, TerminalChannel, WitClient, WriterSink,
};
use tokio::io::BufReader;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub http: HttpClient,
    pub settings: Arc<dyn SettingsRepository>,
    pub assistant: Arc<Assistant>,
    pub spool: Arc<ChatSpool>,
}

impl AppContext {
    /// Open the settings store and build every service.
    ///
    /// # Errors
    /// Fails when the database cannot be opened or migrated, or the HTTP
    /// client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;
        let http = HttpClient::from_config(&config.http)?;

        let settings: Arc<dyn SettingsRepository> =
            Arc::new(SqliteSettingsRepository::new(Arc::clone(&db)));
        let nlu: Arc<dyn NluClassifier> =
            Arc::new(WitClient::from_config(http.clone(), &config.nlu));
        let backends: Arc<dyn BackendFactory> = Arc::new(HttpBackendFactory::new(http.clone()));

        let assistant = Arc::new(Assistant::new(
            nlu,
            Arc::clone(&settings),
            backends,
            config.bot.clone(),
        ));
        let spool = Arc::new(ChatSpool::new(assistant.clone()));

        info!(database = %db.path().display(), "application context ready");
        Ok(Self { config, db, http, settings, assistant, spool })
    }

    /// Run every enabled channel until `shutdown` is cancelled or all of
    /// them stop. Returns the first channel error.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut tasks: JoinSet<Result<()>> = JoinSet::new();

        if self.config.web.enabled {
            let listener = bind(&self.config.web.bind_address).await?;
            let router = web::router(Arc::clone(&self.spool), Arc::new(Outbox::new()));
            tasks.spawn(serve("web", listener, router, shutdown.clone()));
        }

        if self.config.proxy.enabled {
            let settings = self.config.proxy.backend.as_ref().ok_or_else(|| {
                RendezvousError::Config("proxy enabled without a backend to expose".into())
            })?;
            let listener = bind(&self.config.proxy.bind_address).await?;
            let router =
                proxy::router(Arc::new(create_backend(settings, &self.http)), self.config.proxy.token.clone());
            tasks.spawn(serve("proxy", listener, router, shutdown.clone()));
        }

        if self.config.terminal.enabled {
            // Without another channel, closing the terminal ends the process.
            let last_channel = tasks.is_empty();
            let sink: Arc<dyn ReplySink> = Arc::new(WriterSink::new(tokio::io::stdout()));
            let channel =
                TerminalChannel::new(Arc::clone(&self.spool), sink, &self.config.terminal.user);
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                let result = channel.run(BufReader::new(tokio::io::stdin()), shutdown.clone()).await;
                if last_channel {
                    shutdown.cancel();
                }
                result
            });
        }

        if tasks.is_empty() {
            warn!("no chat channel enabled; nothing to do");
            return Ok(());
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| RendezvousError::Internal(format!("channel task: {e}")));
            if let Err(err) = outcome.and_then(|result| result) {
                error!(error = %err, "channel stopped with an error");
                shutdown.cancel();
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Flush and release the settings store.
    pub fn close(&self) -> Result<()> {
        self.db.close()
    }
}
