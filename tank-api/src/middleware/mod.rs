//! Middleware modules for Tank API
//!
//! - `auth`: authentication and the role gate for image cache routes
//!
//! # Middleware Order
//!
//! The role gate reads the context the auth middleware inserts, so it must
//! be the inner layer:
//!
//! ```ignore
//! Router::new()
//!     .route("/detail", get(detail))
//!     .layer(middleware::from_fn(require_registered_role))
//!     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
//! ```

mod auth;

pub use auth::{
    auth_middleware, extract_auth_context, require_registered_role, AuthExtractor,
    AuthMiddlewareError, AuthMiddlewareState,
};
