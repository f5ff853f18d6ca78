//! API Server
//!
//! Server setup, middleware stack, and graceful shutdown.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware, track_metrics_middleware},
    routes::create_router,
};
use crate::casino_store;
use crate::config::StakehouseConfig;
use crate::metrics::MetricsRegistry;
use crate::settlement::SettlementManager;
use crate::storage::Store;

/// Username of the operator account created on first start.
const OWNER_USERNAME: &str = "owner";

pub struct ApiServer {
    config: StakehouseConfig,
    store: Store,
}

impl ApiServer {
    pub fn new(config: StakehouseConfig, store: Store) -> Self {
        Self { config, store }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "stakehouse=info,tower_http=info".into()),
            )
            .init();

        info!("🎰 Starting Stakehouse API Server");

        // Make sure the operator path is usable on a fresh store.
        let owner = casino_store::ensure_owner(&self.store, OWNER_USERNAME)?;
        info!("   Owner account: {} ({})", owner.username, owner.id);

        self.run_http().await
    }

    async fn run_http(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.get_socket_addr()?;
        let app = self.create_app();

        info!("🌐 Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("✅ Stakehouse API Server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("🛑 API Server stopped gracefully");
        Ok(())
    }

    /// Create the application with the full middleware stack. Public so
    /// integration tests can drive the router without a socket.
    pub fn create_app(&self) -> axum::Router {
        let metrics = Arc::new(MetricsRegistry::new());

        let state = Arc::new(AppState {
            settlement: SettlementManager::new(self.store.clone()),
            metrics,
            starting_balance_cents: self.config.game.starting_balance_cents,
            version: env!("CARGO_PKG_VERSION").to_string(),
        });

        create_router(state.clone())
            // Request ID middleware (first for tracing)
            .layer(axum::middleware::from_fn(request_id_middleware))
            // CORS layer (before timeout to handle preflight)
            .layer(create_cors_layer(self.config.server.cors_origins.clone()))
            // Timeout layer
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.request_timeout_seconds,
            )))
            // Tracing layer (last for complete request tracing)
            .layer(TraceLayer::new_for_http())
            // Metrics layer (outermost so timed-out requests are counted)
            .layer(axum::middleware::from_fn_with_state(
                state,
                track_metrics_middleware,
            ))
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        info!("📋 Server Configuration:");
        info!("   CORS: {:?}", self.config.server.cors_origins);
        info!(
            "   Request timeout: {}s",
            self.config.server.request_timeout_seconds
        );
        info!("   Data directory: {}", self.config.storage.data_directory);

        info!("📊 Available endpoints:");
        info!("   GET  /health                  - Health check");
        info!("   GET  /status                  - Service status");
        info!("   GET  /metrics                 - Prometheus metrics");
        info!("   POST /api/games/<game>        - Place a wager");
        info!("   POST /api/games/mines/start   - Start a mines round");
        info!("   POST /api/games/mines/reveal  - Reveal a tile");
        info!("   POST /api/games/mines/cashout - Cash out a round");
        info!("   GET  /api/games/history       - Wager history");
        info!("   POST /api/players             - Create player (admin)");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
