//! Web layer
//!
//! HTTP interface for the school registry. Handlers stay thin and delegate
//! to the service layer; responses use a standard envelope; listing
//! parameters are clamped at the boundary.

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::database::Database;
use crate::services::SchoolService;

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod responses;

pub use extractors::ListParams;
pub use responses::{ApiResponse, handle_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub school_service: Arc<SchoolService>,
    pub upload_path: PathBuf,
    pub max_upload_size: usize,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, database: Database, school_service: Arc<SchoolService>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address: {e}"))?;

        let state = AppState {
            database,
            school_service,
            upload_path: config.storage.upload_path.clone(),
            max_upload_size: config.storage.max_upload_size,
        };

        Ok(Self {
            app: Self::create_router(state, config.storage.max_upload_size),
            addr,
        })
    }

    fn create_router(state: AppState, max_upload_size: usize) -> Router {
        use utoipa_swagger_ui::SwaggerUi;

        Router::new()
            .route(
                "/api/schools",
                get(handlers::schools::list_schools).post(handlers::schools::create_school),
            )
            .route(
                "/api/schools/{id}",
                get(handlers::schools::get_school)
                    .put(handlers::schools::update_school)
                    .delete(handlers::schools::delete_school),
            )
            .route("/health", get(handlers::health::health_check))
            .merge(
                SwaggerUi::new("/docs").url("/api/openapi.json", openapi::openapi_spec()),
            )
            // Multipart bodies carry the image; leave headroom over the
            // configured image cap for the scalar fields.
            .layer(DefaultBodyLimit::max(max_upload_size + 64 * 1024))
            .layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state)
    }

    /// Build the router only, for in-process testing
    pub fn router(config: &Config, database: Database, school_service: Arc<SchoolService>) -> Router {
        let state = AppState {
            database,
            school_service,
            upload_path: config.storage.upload_path.clone(),
            max_upload_size: config.storage.max_upload_size,
        };
        Self::create_router(state, config.storage.max_upload_size)
    }

    /// Bind and serve until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on {}", self.addr);

        let shutdown_signal = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
