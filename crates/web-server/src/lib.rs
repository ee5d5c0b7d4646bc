use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use configuration::{AuthSettings, Settings};
use database::{ClientStore, DbRepository};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod response;

use auth::{CookieSettings, CredentialVerifier, SessionStore, StaticCredentials};

/// How often expired sessions are swept out of memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClientStore>,
    pub sessions: SessionStore,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub cookie: CookieSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ClientStore>,
        credentials: Arc<dyn CredentialVerifier>,
        auth: &AuthSettings,
    ) -> Self {
        Self {
            store,
            sessions: SessionStore::new(auth.session_ttl()),
            credentials,
            cookie: CookieSettings::from_settings(auth),
        }
    }
}

/// Assembles every route. Protected routes sit behind the matching gate.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/clients/:id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_session,
        ))
        // Added after the gate, so reachable while anonymous.
        .route("/login", post(handlers::api_login))
        .route("/logout", post(handlers::api_logout));

    let protected_pages = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/clients", get(pages::clients_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_page_session,
        ));

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(|| async { "OK" }))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", get(pages::logout))
        .merge(protected_pages)
        .nest("/api", api)
        .with_state(state)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
}

/// Connects to the database, wires the state and serves until shutdown.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database)?;
    if settings.database.run_migrations {
        database::run_migrations(&pool).await?;
    }

    let store: Arc<dyn ClientStore> = Arc::new(DbRepository::new(pool.clone()));
    let credentials: Arc<dyn CredentialVerifier> =
        Arc::new(StaticCredentials::from_settings(&settings.auth));
    let app_state = Arc::new(AppState::new(store, credentials, &settings.auth));

    let sweeper = tokio::spawn(sweep_sessions(app_state.sessions.clone()));
    let app = build_router(app_state);

    let listener =
        tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port)).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    pool.close().await;
    tracing::info!("Web server stopped, database pool closed.");

    Ok(())
}

async fn sweep_sessions(sessions: SessionStore) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = sessions.purge_expired();
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions purged.");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received.");
}
