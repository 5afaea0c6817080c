//! HTTP server for the todo app: the `/api/todos` JSON API and the
//! server-rendered home page, backed by a lazily connected store.

use std::{io, sync::Arc};

use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod model;
pub mod page;
pub mod routes;

use config::{StoreBackend, StoreConfig};
use db::{ConnectionPool, Connector, MemoryConnector, MongoConnector};
use routes::{create_todo, delete_todo, get_todo, list_todos, update_todo};

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ConnectionPool>,
}

impl AppState {
    pub fn new(connector: impl Connector) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new(connector)),
        }
    }

    /// Fresh, empty in-process store.
    pub fn in_memory() -> Self {
        Self::new(MemoryConnector::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        match config.backend {
            StoreBackend::Mongo => Self::new(MongoConnector::from_config(config)),
            StoreBackend::Memory => Self::in_memory(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::home_page))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM, letting in-flight requests finish.
pub async fn run(listener: TcpListener, state: AppState) -> Result<(), io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
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
