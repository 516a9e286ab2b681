//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use order_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use orchestrator::{CatalogClient, HttpCatalogClient, HttpIdentityClient, IdentityClient};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Order store: Postgres when configured, in memory otherwise
    let repository: Arc<dyn OrderRepository> = match &config.database_url {
        Some(url) => Arc::new(
            PostgresOrderRepository::connect(url, 10)
                .await
                .expect("failed to connect to the order store"),
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    // 4. Downstream clients
    let identity: Arc<dyn IdentityClient> = Arc::new(
        HttpIdentityClient::new(&config.users_service_url, config.downstream_timeout)
            .expect("failed to build identity client"),
    );
    let catalog: Arc<dyn CatalogClient> = Arc::new(
        HttpCatalogClient::new(&config.products_service_url, config.downstream_timeout)
            .expect("failed to build catalog client"),
    );
    tracing::info!(
        identity = %config.users_service_url,
        catalog = %config.products_service_url,
        "downstream services configured"
    );

    // 5. Build the application
    let state = api::create_state(repository, identity, catalog, &config);
    let app = api::create_app(state, metrics_handle, &config.cors_allowed_origin);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
