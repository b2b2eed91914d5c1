use crate::config::Config;
use crate::pipeline::PipelineRunner;
use crate::services::Services;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use clipforge_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod routes_presets;
pub mod routes_templates;
pub mod routes_tracks;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db_pool: DbPool,
    pub services: Services,
    pub runner: Arc<PipelineRunner>,
}

impl AppContext {
    /// Get a pooled connection, mapped to the common error type.
    pub fn conn(&self) -> clipforge_common::Result<clipforge_db::pool::PooledConnection> {
        clipforge_db::pool::get_conn(&self.db_pool)
    }
}

/// Map a library error onto an HTTP response.
pub fn error_response(err: clipforge_common::Error) -> (StatusCode, String) {
    use clipforge_common::Error;
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let media_dir = ctx.config.media.output_dir.clone();
    let media_route = ctx.config.media.base_url.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .nest_service(&media_route, ServeDir::new(media_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    app
}

fn api_routes() -> Router<AppContext> {
    routes_templates::template_routes()
        .merge(routes_presets::preset_routes())
        .merge(routes_tracks::track_routes())
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config, db_pool: DbPool, services: Services) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let runner = Arc::new(PipelineRunner::new(
        db_pool.clone(),
        services.clone(),
        Duration::from_secs(config.engine.step_timeout_secs),
    ));

    let ctx = AppContext {
        config: Arc::new(config),
        db_pool,
        services,
        runner,
    };

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
