//! REST API Routes Module
//!
//! - Image cache routes under /api/image/cache/* (authenticated)
//! - Health check endpoints under /health/* (public)
//! - OpenAPI document at /openapi.json

pub mod health;
pub mod image_cache;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, require_registered_role, AuthMiddlewareState};
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub use health::create_router as health_router;
pub use image_cache::create_router as image_cache_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

fn is_production_environment() -> bool {
    std::env::var("TANK_ENVIRONMENT")
        .map(|e| matches!(e.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::invalid_input(
            "CORS origins not configured for production. Set TANK_CORS_ORIGINS.",
        ));
    }
    if config.artifact_root.is_none() {
        tracing::warn!("TANK_ARTIFACT_ROOT is unset; deleted caches will leave their files behind");
    }
    Ok(())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. Trace
/// 2. CORS
/// 3. Timeout
/// 4. Auth, then the role gate (only on /api/image/cache/*)
pub fn create_api_router(
    state: AppState,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    if is_production_environment() {
        auth_config.validate_for_production()?;
        validate_api_config_for_production(api_config)?;
    }

    let auth_state = AuthMiddlewareState::new(auth_config);

    let image_cache_routes = image_cache::create_router()
        .layer(from_fn(require_registered_role))
        .layer(from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    let router = Router::new()
        .nest("/api/image/cache", image_cache_routes)
        .nest("/health", health::create_router(state.db.clone(), state.start_time))
        .route("/openapi.json", get(openapi_json));

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer(api_config))
            .layer(timeout_layer(api_config)),
    ))
}

/// Requests running past `request_timeout` are answered with 408.
fn timeout_layer(config: &ApiConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Allow every origin when none are configured; otherwise only those
/// `ApiConfig::is_origin_allowed` accepts.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        return cors.allow_origin(Any).allow_headers(Any);
    }

    tracing::info!(origins = ?config.cors_origins, "CORS: restricted origins");
    let allowed = config.clone();
    let cors = cors
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| allowed.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ));

    if config.cors_allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}
