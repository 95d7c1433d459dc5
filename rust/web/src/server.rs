use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::{Reply, Response};
use warp::Filter;

use crate::archiver::Archiver;
use crate::config::AppConfig;
use crate::engine::StandardEngineFactory;
use crate::handlers;
use crate::history::{ArchiveError, HandArchive, MemoryArchive};
use crate::middleware::with_request_logging;
use crate::registry::HandStore;
use crate::service::HandService;
use crate::sqlite_store::SqliteArchive;

/// Largest request body accepted by the JSON endpoints.
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Everything request handlers share, built once per server.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: AppConfig,
    service: Arc<HandService>,
}

impl AppContext {
    /// Builds the context, opening the SQLite archive when one is configured.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|err| ServerError::ConfigError(err.to_string()))?;
        let archive: Arc<dyn HandArchive> = match &config.archive.database {
            Some(path) => {
                tracing::info!(path = %path.display(), "using sqlite hand archive");
                Arc::new(SqliteArchive::open(path)?)
            }
            None => Arc::new(MemoryArchive::new()),
        };
        Ok(Self::with_archive(config, archive))
    }

    pub fn with_archive(config: AppConfig, archive: Arc<dyn HandArchive>) -> Self {
        let factory = Arc::new(StandardEngineFactory::new(config.table.seed));
        let store = Arc::new(HandStore::new(factory, config.table.rules()));
        let archiver = Arc::new(Archiver::new(archive, config.archive.retry_policy()));
        let service = Arc::new(HandService::new(store, archiver));
        Self { config, service }
    }

    /// In-memory archive and a fixed deal seed.
    pub fn new_for_tests() -> Self {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.table.seed = Some(42);
        Self::with_archive(config, Arc::new(MemoryArchive::new()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<HandService> {
        Arc::clone(&self.service)
    }

    pub fn archiver(&self) -> Arc<Archiver> {
        Arc::clone(self.service.archiver())
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let context = AppContext::new(config)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Binds the listener, serves until shut down and runs the archive
    /// retry sweep alongside.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(%addr, "hand server listening");

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });
        let sweeper = Self::spawn_retry_sweep(&context);

        Ok(ServerHandle::new(addr, shutdown_tx, task, sweeper, context))
    }

    fn spawn_retry_sweep(context: &AppContext) -> JoinHandle<()> {
        let archiver = context.archiver();
        let period = context.config().archive.retry_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if archiver.pending_count() == 0 {
                    continue;
                }
                let archiver = Arc::clone(&archiver);
                match tokio::task::spawn_blocking(move || archiver.retry_pending()).await {
                    Ok(stored) if stored > 0 => {
                        tracing::info!(stored, "archive retry sweep stored hands");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "archive retry sweep panicked"),
                }
            }
        })
    }

    fn bind_addr(config: &AppConfig) -> Result<SocketAddr, ServerError> {
        let host = config.server.host.as_str();
        let port = config.server.port;

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, port));
        }

        let candidate = format!("{host}:{port}");
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    /// Every endpoint, wrapped in request logging.
    pub fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let welcome = warp::path::end()
            .and(warp::get())
            .map(handlers::welcome);

        let service = context.service();
        let health = warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(move || handlers::health(&service).into_response());

        let routes = welcome
            .or(health)
            .unify()
            .or(Self::hand_routes(context))
            .unify()
            .boxed();
        with_request_logging(routes)
    }

    fn hand_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let service = context.service();

        let create = warp::path!("api" / "hands" / "create")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(Self::with_service(service.clone()))
            .and(warp::body::bytes())
            .then(handlers::create_hand);

        let action = warp::path!("api" / "hands" / "action")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(Self::with_service(service.clone()))
            .and(warp::body::bytes())
            .then(handlers::perform_action);

        let list = warp::path!("api" / "hands")
            .and(warp::get())
            .and(Self::with_service(service.clone()))
            .and(warp::query::<handlers::ListHandsQuery>())
            .then(handlers::list_hands);

        let state = warp::path!("api" / "hands" / String / "state")
            .and(warp::get())
            .and(Self::with_service(service.clone()))
            .then(|hand_id: String, service: Arc<HandService>| {
                handlers::get_hand_state(service, hand_id)
            });

        let by_id = warp::path!("api" / "hands" / String)
            .and(warp::get())
            .and(Self::with_service(service))
            .then(|hand_id: String, service: Arc<HandService>| {
                handlers::get_hand(service, hand_id)
            });

        create
            .or(action)
            .unify()
            .or(list)
            .unify()
            .or(state)
            .unify()
            .or(by_id)
            .unify()
            .boxed()
    }

    fn with_service(
        service: Arc<HandService>,
    ) -> impl Filter<Extract = (Arc<HandService>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&service))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    sweeper: Option<JoinHandle<()>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        sweeper: JoinHandle<()>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            sweeper: Some(sweeper),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        let pending = self.context.archiver().pending_count();
        if pending > 0 {
            tracing::warn!(pending, "shutting down with hands still waiting to be archived");
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_shares_one_service() {
        let ctx = AppContext::new_for_tests();
        assert!(Arc::ptr_eq(&ctx.service(), &ctx.clone().service()));
        assert_eq!(ctx.service().store().len(), 0);
        assert_eq!(ctx.archiver().pending_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.table.min_bet = 1;
        assert!(matches!(
            AppContext::new(config),
            Err(ServerError::ConfigError(_))
        ));
    }

    #[test]
    fn sqlite_archive_is_opened_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.archive.database = Some(dir.path().join("hands.sqlite"));
        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.service().archived_hands(None).unwrap().is_empty());
        assert!(dir.path().join("hands.sqlite").exists());
    }

    #[tokio::test]
    async fn starts_and_stops_on_an_ephemeral_port() {
        let server = WebServer::from_context(AppContext::new_for_tests());
        let handle = server.start().await.unwrap();
        assert_ne!(handle.address().port(), 0);
        handle.shutdown().await.unwrap();
    }
}
