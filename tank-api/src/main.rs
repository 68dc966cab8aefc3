//! Tank API Server Entry Point
//!
//! Bootstraps configuration, opens the configured record store and starts
//! the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tank_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, DbClient, DbConfig,
    StoreBackend,
};
use tank_storage::{ArtifactStore, InMemoryImageCacheStore, LocalArtifactStore, NoopArtifactStore};

use tank_api::telemetry::{init_tracing, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let artifacts: Arc<dyn ArtifactStore> = match &api_config.artifact_root {
        Some(root) => {
            tracing::info!(root = %root.display(), "Removing cached artifacts under root");
            Arc::new(LocalArtifactStore::new(root.clone()))
        }
        None => Arc::new(NoopArtifactStore),
    };

    let state = match api_config.store_backend {
        StoreBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.ensure_schema().await?;
            AppState::with_database(db, artifacts, api_config.paging)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on restart");
            AppState::with_store(
                Arc::new(InMemoryImageCacheStore::new()),
                artifacts,
                api_config.paging,
            )
        }
    };

    let app: Router = create_api_router(state, &api_config, auth_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, backend = ?api_config.store_backend, "Starting Tank API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("TANK_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("TANK_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
