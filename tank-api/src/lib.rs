//! Tank API - REST layer for image cache records
//!
//! Exposes detail, paging and deletion of image caches over Axum. Every
//! operation is scoped to the authenticated caller: records of other users
//! are neither listed nor readable nor deletable.
//!
//! Records live in PostgreSQL (`db`) or in process memory; the cached
//! artifact files behind them are removed through `tank_storage`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{
    authenticate, authenticate_api_key, authenticate_jwt, generate_jwt_token, validate_api_key,
    validate_jwt_token, AuthConfig, AuthContext, AuthMethod, Claims, JwtSecret,
};
pub use config::{ApiConfig, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::FormParams;
pub use middleware::{
    auth_middleware, extract_auth_context, require_registered_role, AuthExtractor,
    AuthMiddlewareState,
};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::ImageCacheService;
pub use state::AppState;
pub use types::*;
