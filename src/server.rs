//! Relay composition root.
//!
//! Wires configuration into the registry, dispatcher, auth gate and
//! revocation sync, and runs them behind the HTTP router until shutdown.
//!
//! # Shutdown
//!
//! One `watch` channel fans the shutdown signal out to every long-lived
//! task. When the signal fires the listener stops accepting, sessions close,
//! and `serve` returns only after the dispatch worker (with its eviction
//! task) and the revocation sync have finished.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::adapters::auth::{
    AuthGate, HmacTokenValidator, HttpRevocationSource, RevocationCache, RevocationSync,
};
use crate::adapters::http::{build_router, AppState};
use crate::adapters::websocket::{
    dispatcher, DispatchWorker, Dispatcher, DispatcherConfig, OriginPolicy, RoomRegistry,
    SessionConfig, WebSocketState,
};
use crate::config::AppConfig;
use crate::ports::RevocationError;

/// Errors that prevent the relay from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Authentication is required but no signing secret is configured")]
    MissingSecret,

    #[error("Failed to build revocation client: {0}")]
    RevocationClient(#[from] RevocationError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Explicit relay wiring, used directly by tests and by [`Relay::from_config`].
pub struct RelaySettings {
    pub origins: OriginPolicy,
    pub auth: AuthGate,
    pub dispatcher: DispatcherConfig,
    pub session: SessionConfig,
    pub revocation: Option<RevocationSync>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            origins: OriginPolicy::allow_any(),
            auth: AuthGate::Open,
            dispatcher: DispatcherConfig::default(),
            session: SessionConfig::default(),
            revocation: None,
        }
    }
}

/// A fully wired relay, ready to serve.
pub struct Relay {
    state: AppState,
    worker: DispatchWorker,
    revocation: Option<RevocationSync>,
    shutdown: watch::Sender<bool>,
}

impl Relay {
    pub fn new(settings: RelaySettings) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let (dispatcher, worker) = dispatcher(registry.clone(), settings.dispatcher);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let relay = WebSocketState {
            registry,
            dispatcher,
            auth: settings.auth,
            origins: settings.origins,
            session: settings.session,
            shutdown: shutdown_rx,
        };

        Self {
            state: AppState::new(relay),
            worker,
            revocation: settings.revocation,
            shutdown,
        }
    }

    /// Build a relay from validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let origins = OriginPolicy::new(config.server.allowed_origins_list());
        if origins.allows_any() {
            tracing::warn!("ALLOWED_ORIGINS is empty: accepting WebSocket upgrades from any origin");
        }

        let (auth, revocation) = if config.auth.require_auth {
            let secret = config.auth.secret().ok_or(StartupError::MissingSecret)?;
            let cache = Arc::new(RevocationCache::new());
            let validator = HmacTokenValidator::new(secret, cache.clone());
            let source = HttpRevocationSource::new(&config.auth.auth_service_url)?;
            tracing::info!(url = source.url(), "Revocation list source configured");

            let sync = RevocationSync::new(
                Arc::new(source),
                cache,
                config.auth.revoked_sync_interval(),
            );
            (AuthGate::required(Arc::new(validator)), Some(sync))
        } else {
            tracing::warn!("WS_REQUIRE_AUTH is off: connections are admitted without credentials");
            (AuthGate::Open, None)
        };

        Ok(Self::new(RelaySettings {
            origins,
            auth,
            dispatcher: DispatcherConfig::default()
                .with_queue_capacity(config.server.dispatch_queue_capacity)
                .with_write_timeout(config.server.write_timeout()),
            session: SessionConfig::default(),
            revocation,
        }))
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.state.relay.registry.clone()
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.state.relay.dispatcher.clone()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve on `listener` until `signal` resolves, then drain background tasks.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let Self {
            state,
            worker,
            revocation,
            shutdown,
        } = self;
        drop(state);

        let shutdown = Arc::new(shutdown);
        let worker = tokio::spawn(worker.run(shutdown.subscribe()));
        let revocation = revocation.map(|sync| tokio::spawn(sync.run(shutdown.subscribe())));

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "Notification relay listening");
        }

        let trigger = shutdown.clone();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                tracing::info!("Shutting down");
                let _ = trigger.send(true);
            })
            .await;

        let _ = shutdown.send(true);
        if let Err(e) = worker.await {
            tracing::error!("Dispatch worker failed: {}", e);
        }
        if let Some(handle) = revocation {
            if let Err(e) = handle.await {
                tracing::error!("Revocation sync failed: {}", e);
            }
        }

        tracing::info!("Notification relay stopped");
        served.map_err(StartupError::from)
    }
}
