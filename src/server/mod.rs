//! HTTP surface: router, shared state and server lifecycle.

pub mod gate;
pub mod pages;
pub mod routes;

use crate::config::Config;
use crate::core::session::SessionSealer;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<DbPool>,
    pub sealer: Arc<SessionSealer>,
}

impl AppState {
    /// Fails when the session secret is missing or too short.
    /// The store is not touched until the first request needs it.
    pub fn new(config: Config) -> AppResult<Self> {
        let sealer = SessionSealer::new(config.require_session_secret()?, config.session_ttl_secs)?;
        let db = DbPool::new(config.database.clone());

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            sealer: Arc::new(sealer),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_page))
        .route("/static/{file}", get(pages::static_file))
        .route("/favicon.ico", get(pages::favicon))
        .route("/api/login", post(routes::login))
        .route(
            "/api/timesheet",
            get(routes::list_entries).post(routes::create_entry),
        )
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::session_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second call (tests) keeps the first subscriber
    let _ = fmt().with_env_filter(filter).try_init();
}

pub async fn start_server(state: AppState, bind: &str) -> AppResult<()> {
    info!("Binding to {bind}");
    let listener = TcpListener::bind(bind).await?;
    let address = listener.local_addr()?;
    info!(database = %state.db.path(), "Server running on http://{address}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
