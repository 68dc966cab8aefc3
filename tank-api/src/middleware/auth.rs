//! Axum Middleware for Authentication
//!
//! - Authenticates requests using API keys or JWT tokens
//! - Injects `AuthContext` into request extensions
//! - Returns 401 for unauthenticated requests
//! - Returns 403 for guest accounts on image cache routes

use crate::auth::{authenticate, AuthConfig, AuthContext};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTIONS
// ============================================================================

/// Authenticate from `X-API-Key` or `Authorization: Bearer` and insert the
/// resulting `AuthContext` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let api_key_header = request
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let auth_context = authenticate(&state.auth_config, api_key_header, auth_header)
        .map_err(|e| {
            tracing::debug!(code = %e.code, "Request authentication failed");
            AuthMiddlewareError(e)
        })?;

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

/// Reject guest accounts. Must run inside `auth_middleware`.
pub async fn require_registered_role(
    request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth = extract_auth_context(&request).map_err(AuthMiddlewareError)?;

    if !auth.role.is_registered() {
        tracing::warn!(user_uuid = %auth.user_uuid, "Guest account refused");
        return Err(AuthMiddlewareError(ApiError::forbidden(
            "A registered account is required",
        )));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Middleware rejection rendered as a JSON `ApiError`.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        let api_error = self.0;
        (api_error.status_code(), axum::Json(api_error)).into_response()
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Handler argument carrying the authenticated context.
///
/// Yields 500 if `auth_middleware` is not applied to the route.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "AuthContext not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn extract_auth_context(request: &Request) -> ApiResult<&AuthContext> {
    request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::unauthorized("Auth context missing from request"))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt_token, FixedClock, JwtSecret};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tank_core::UserRole;
    use tower::ServiceExt;

    fn test_auth_config() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.add_api_key("test_key_123", "user-1");
        config.jwt_secret =
            JwtSecret::new("test_secret".to_string()).expect("test secret should be valid");
        config.clock = Arc::new(FixedClock(1704067200));
        config
    }

    async fn whoami(auth: AuthExtractor) -> String {
        format!("User: {}, Method: {:?}", auth.user_uuid, auth.auth_method)
    }

    fn test_app() -> Router {
        let auth_state = AuthMiddlewareState::new(test_auth_config());

        Router::new()
            .route("/protected", get(whoami))
            .layer(middleware::from_fn(require_registered_role))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
    }

    async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, String), String> {
        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| format!("Failed to read body: {:?}", e))?;
        let body = String::from_utf8(body.to_vec()).map_err(|e| e.to_string())?;
        Ok((status, body))
    }

    fn bearer(role: UserRole) -> Result<String, String> {
        let token = generate_jwt_token(&test_auth_config(), "user-2", "bob", role)
            .map_err(|e| e.to_string())?;
        Ok(format!("Bearer {}", token))
    }

    #[tokio::test]
    async fn test_middleware_with_valid_api_key() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("x-api-key", "test_key_123")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, body) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User: user-1, Method: ApiKey");
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_api_key() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("x-api-key", "invalid_key")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, _) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_without_authentication() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, body) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_valid_jwt() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("authorization", bearer(UserRole::User)?)
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, body) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User: user-2, Method: Jwt");
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_malformed_auth_header() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("authorization", "Token abc")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, body) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("INVALID_TOKEN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_guest_is_forbidden() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("authorization", bearer(UserRole::Guest)?)
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, body) = send(test_app(), request).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("FORBIDDEN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_extractor_without_middleware() -> Result<(), String> {
        let app = Router::new().route("/unprotected", get(whoami));

        let request = Request::builder()
            .uri("/unprotected")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let (status, _) = send(app, request).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
