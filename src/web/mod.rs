//! Web server module.

mod handlers;

pub use handlers::*;

use crate::collector::Collector;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    /// Serializes scrapes so passes never overlap.
    pub scrape_lock: Arc<Mutex<()>>,
}

/// Web server exposing the collector.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server around the given collector.
    pub fn new(collector: Arc<Collector>) -> Self {
        Self {
            state: AppState {
                collector,
                scrape_lock: Arc::new(Mutex::new(())),
            },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::handle_home))
            .route("/metrics", get(handlers::handle_metrics))
            .route("/version", get(handlers::handle_version))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let router = self.routes();

        tracing::info!("Listening on {} ...", listener.local_addr()?);

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Bind `addr` and serve until the process exits.
    pub async fn start(&self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }
}
