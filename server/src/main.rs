mod api;
mod config;
mod db;
mod error;
mod models;
mod schema;
mod store;

use anyhow::Context;
use axum::extract::MatchedPath;
use axum::http::Request;
use config::DbConfig;
use std::sync::Arc;
use std::time::Duration;
use store::{Catalog, PgCatalog};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    /// Bound on each store call made while serving a request.
    pub db_timeout: Duration,
    /// How long a store call may wait for a worker before it is dropped.
    pub queue_timeout: Duration,
}

fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown requested, draining in-flight requests");
}

async fn run() -> anyhow::Result<()> {
    let db_config = DbConfig::from_env().context("Invalid database configuration")?;

    tracing::info!(
        "Connecting to database {} at {}:{}",
        db_config.name,
        db_config.host,
        db_config.port
    );

    let connection_string = db_config.connection_string();
    let pool = tokio::task::spawn_blocking(move || {
        db::create_pool(
            &connection_string,
            config::DB_CHECKOUT_TIMEOUT,
            config::DB_STATEMENT_TIMEOUT,
        )
    })
    .await
    .context("Database bootstrap task failed")?
    .context("Failed to initialize database")?;

    tracing::info!("Database ready, schema is up to date");

    let state = AppState {
        catalog: Arc::new(PgCatalog::new(pool)),
        db_timeout: config::DB_TIMEOUT,
        queue_timeout: config::DB_QUEUE_TIMEOUT,
    };

    let routes = api::route_table();
    tracing::debug!("Cross-origin methods: {:?}", routes.methods());

    let app = routes.into_router().with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %matched_path,
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request completed"
                        );
                    }
                },
            ),
    );

    let listener = tokio::net::TcpListener::bind(config::LISTEN_ADDR)
        .await
        .with_context(|| format!("Failed to bind {}", config::LISTEN_ADDR))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router, and with it the last handle on the pool, is gone by now;
    // every pooled connection has been closed.
    tracing::info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_telemetry();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
