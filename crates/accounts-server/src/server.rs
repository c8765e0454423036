use std::{net::SocketAddr, sync::Arc, time::Duration};

use accounts_auth::{
    AuthState, CredentialValidator, OwnershipGuard, TokenConfig, TokenService, TokenVerifier,
    UserStorage, authentication_middleware,
};
use accounts_auth_postgres::PostgresAuthStorage;
use anyhow::Context;
use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, FromRef},
    http::{Request, Response},
    middleware,
    routing::get,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::{
    accounts,
    config::{AppConfig, StorageBackend},
    handlers,
    middleware::{RequestId, request_id},
};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStorage>,
    pub credentials: CredentialValidator,
    pub guard: OwnershipGuard,
    pub auth: AuthState,
}

impl AppState {
    /// Wires the token service, verifier and validator around `users`.
    pub fn new(users: Arc<dyn UserStorage>, token: &TokenConfig) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::new(token));
        let verifier = TokenVerifier::new(Arc::clone(&tokens), Arc::clone(&users));
        let auth = AuthState::new(verifier).context("invalid token header configuration")?;
        Ok(Self {
            credentials: CredentialValidator::new(Arc::clone(&users), tokens),
            users,
            guard: OwnershipGuard,
            auth,
        })
    }

    /// Opens the configured storage backend and builds the state on top.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let users = open_user_storage(cfg).await?;
        Self::new(users, &cfg.auth.token)
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

async fn open_user_storage(cfg: &AppConfig) -> anyhow::Result<Arc<dyn UserStorage>> {
    match cfg.storage.backend {
        StorageBackend::Memory => {
            tracing::info!(backend = "memory", "user storage ready");
            Ok(accounts_db_memory::create_user_storage())
        }
        StorageBackend::Postgres => {
            let pg = &cfg.storage.postgres;
            let storage = PostgresAuthStorage::connect(&pg.url, pg.pool_size)
                .await
                .context("failed to connect to PostgreSQL")?;
            storage
                .ensure_schema()
                .await
                .context("failed to create the users table")?;
            tracing::info!(backend = "postgres", pool_size = pg.pool_size, "user storage ready");
            Ok(Arc::new(storage.users()))
        }
    }
}

/// Builds the application router for `cfg`, opening its storage backend.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg).await?;
    Ok(router(cfg, state))
}

/// Assembles routes and middleware around an existing state.
pub fn router(cfg: &AppConfig, state: AppState) -> Router {
    // Token authentication runs before every /api handler.
    let api = accounts::routes().layer(middleware::from_fn_with_state(
        state.auth.clone(),
        authentication_middleware,
    ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(api)
        .with_state(state)
        // Layers run outermost-last: request id -> trace -> cors -> compression -> body limit
        .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<RequestId>()
                        .map(RequestId::as_str)
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                    span.record(
                        "http.status_code",
                        tracing::field::display(res.status().as_u16()),
                    );
                    tracing::info!(
                        status = res.status().as_u16(),
                        elapsed_ms = latency.as_millis() as u64,
                        "request handled"
                    );
                }),
        )
        .layer(middleware::from_fn(request_id))
}

pub struct AccountsServer {
    addr: SocketAddr,
    app: Router,
}

impl AccountsServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[derive(Default)]
pub struct ServerBuilder {
    addr: Option<SocketAddr>,
    config: AppConfig,
    users: Option<Arc<dyn UserStorage>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the listen address from the configuration.
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `users` instead of opening the configured backend.
    pub fn with_user_storage(mut self, users: Arc<dyn UserStorage>) -> Self {
        self.users = Some(users);
        self
    }

    pub async fn build(self) -> anyhow::Result<AccountsServer> {
        let addr = self.addr.unwrap_or_else(|| self.config.addr());
        let state = match self.users {
            Some(users) => AppState::new(users, &self.config.auth.token)?,
            None => AppState::from_config(&self.config).await?,
        };
        let app = router(&self.config, state);
        Ok(AccountsServer { addr, app })
    }
}
