//! Authentication Module
//!
//! Resolves the acting user of a request. Two methods are supported:
//! 1. API Key authentication (via X-API-Key header), each key bound to a user
//! 2. JWT token authentication (via Authorization: Bearer header)
//!
//! Token issuance exists only as a helper for tests and tooling.

use crate::error::{ApiError, ApiResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tank_core::{ActingUser, UserRole};

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock used for JWT time validation.
///
/// Time checks are done here rather than inside `jsonwebtoken` so tests can
/// pin the clock and a pre-epoch system clock is reported instead of panicking.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds. Negative before 1970.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}


// ============================================================================
// JWT SECRET
// ============================================================================

/// JWT signing secret. Never printed.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// # Errors
    /// Returns `MissingField` if the secret is empty.
    pub fn new(secret: String) -> ApiResult<Self> {
        if secret.is_empty() {
            return Err(ApiError::missing_field("jwt_secret"));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value. Only for signing and verification.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// API key to the user uuid it acts as
    pub api_keys: HashMap<String, String>,

    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// JWT token expiration in seconds (default: 1 hour)
    pub jwt_expiration_secs: i64,

    /// Tolerated clock drift in seconds when checking `exp` (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for JWT time validation
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_keys", &format!("[{} keys]", self.api_keys.len()))
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret_str = std::env::var("TANK_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            api_keys: HashMap::new(),
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `TANK_API_KEYS`: Comma-separated `key:user_uuid` pairs
    /// - `TANK_JWT_SECRET`: JWT signing secret
    /// - `TANK_JWT_EXPIRATION_SECS`: JWT token expiration (default: 3600)
    /// - `TANK_JWT_CLOCK_SKEW_SECS`: JWT clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let api_keys = std::env::var("TANK_API_KEYS")
            .map(|raw| parse_api_keys(&raw))
            .unwrap_or_default();

        let secret_str = std::env::var("TANK_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            api_keys,
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: std::env::var("TANK_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            jwt_clock_skew_secs: std::env::var("TANK_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            clock: Arc::new(SystemClock),
        }
    }

    /// Refuse insecure secrets when `TANK_ENVIRONMENT` is production.
    ///
    /// Outside production the same problems are only logged.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let environment = std::env::var("TANK_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase();

        let is_production = environment == "production" || environment == "prod";

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "Cannot start server in production with insecure JWT secret. \
                     Set TANK_JWT_SECRET to a secure value. TANK_ENVIRONMENT={}",
                    environment
                )));
            }
            tracing::warn!(
                "Using insecure default JWT secret. Set TANK_JWT_SECRET before deploying."
            );
        }

        if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            } else if !self.jwt_secret.is_insecure_default() {
                tracing::warn!(
                    secret_len = self.jwt_secret.len(),
                    "JWT secret is shorter than 32 characters"
                );
            }
        }

        if self.api_keys.is_empty() {
            tracing::info!("No API keys configured; only bearer tokens are accepted");
        }

        Ok(())
    }

    /// Bind an API key to the user it acts as.
    pub fn add_api_key(&mut self, key: impl Into<String>, user_uuid: impl Into<String>) {
        self.api_keys.insert(key.into(), user_uuid.into());
    }

    /// User uuid bound to `key`, if the key is known.
    pub fn api_key_user(&self, key: &str) -> Option<&str> {
        self.api_keys.get(key).map(String::as_str)
    }
}

/// Parse `key:user_uuid` pairs. Malformed entries are skipped with a warning.
fn parse_api_keys(raw: &str) -> HashMap<String, String> {
    let mut keys = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once(':') {
            Some((key, user)) if !key.trim().is_empty() && !user.trim().is_empty() => {
                keys.insert(key.trim().to_string(), user.trim().to_string());
            }
            _ => tracing::warn!("Ignoring malformed TANK_API_KEYS entry"),
        }
    }
    keys
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims. `sub` is the user uuid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_uuid: String,
        username: String,
        role: UserRole,
        expiration_secs: i64,
        clock: &dyn JwtClock,
    ) -> Self {
        let now = clock.now_epoch_secs();

        Self {
            sub: user_uuid,
            username,
            role,
            iat: now,
            exp: now + expiration_secs,
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Identity of an authenticated request.
///
/// Inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_uuid: String,
    pub username: String,
    pub role: UserRole,
    pub auth_method: AuthMethod,
}

impl AuthContext {
    pub fn new(
        user_uuid: impl Into<String>,
        username: impl Into<String>,
        role: UserRole,
        auth_method: AuthMethod,
    ) -> Self {
        Self {
            user_uuid: user_uuid.into(),
            username: username.into(),
            role,
            auth_method,
        }
    }

    /// The identity image cache operations run as.
    pub fn acting_user(&self) -> ActingUser {
        ActingUser::new(self.user_uuid.clone(), self.username.clone(), self.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ApiKey,
    Jwt,
}

// ============================================================================
// AUTHENTICATION FUNCTIONS
// ============================================================================

/// Resolve the user bound to an API key.
pub fn validate_api_key<'a>(config: &'a AuthConfig, api_key: &str) -> ApiResult<&'a str> {
    config
        .api_key_user(api_key)
        .ok_or_else(|| ApiError::unauthorized("Invalid API key"))
}

/// Check `exp` (and `nbf` when present) against `now` with `leeway_secs`.
fn validate_claim_times(now: i64, exp: i64, nbf: Option<i64>, leeway_secs: i64) -> ApiResult<()> {
    if let Some(nbf) = nbf {
        if now + leeway_secs < nbf {
            return Err(ApiError::unauthorized("Token not yet valid (nbf)"));
        }
    }

    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }

    Ok(())
}

/// Verify a token's signature, then its times against the configured clock.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;

    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error(
            "Server time configuration error - please contact support",
        ));
    }

    validate_claim_times(now, claims.exp, None, config.jwt_clock_skew_secs)?;

    if claims.sub.trim().is_empty() {
        return Err(ApiError::invalid_token("Token has no subject"));
    }

    Ok(claims)
}

/// Sign a token for `user_uuid`.
pub fn generate_jwt_token(
    config: &AuthConfig,
    user_uuid: impl Into<String>,
    username: impl Into<String>,
    role: UserRole,
) -> ApiResult<String> {
    let claims = Claims::new(
        user_uuid.into(),
        username.into(),
        role,
        config.jwt_expiration_secs,
        &*config.clock,
    );

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// API key callers act as the bound user with the `USER` role.
pub fn authenticate_api_key(config: &AuthConfig, api_key: &str) -> ApiResult<AuthContext> {
    let user_uuid = validate_api_key(config, api_key)?;

    Ok(AuthContext::new(
        user_uuid,
        user_uuid,
        UserRole::User,
        AuthMethod::ApiKey,
    ))
}

pub fn authenticate_jwt(config: &AuthConfig, token: &str) -> ApiResult<AuthContext> {
    let claims = validate_jwt_token(config, token)?;

    Ok(AuthContext::new(
        claims.sub,
        claims.username,
        claims.role,
        AuthMethod::Jwt,
    ))
}

/// Authenticate with the API key if present, otherwise the bearer token.
pub fn authenticate(
    config: &AuthConfig,
    api_key_header: Option<&str>,
    auth_header: Option<&str>,
) -> ApiResult<AuthContext> {
    if let Some(api_key) = api_key_header {
        return authenticate_api_key(config, api_key);
    }

    if let Some(auth_value) = auth_header {
        return match auth_value.strip_prefix("Bearer ") {
            Some(token) => authenticate_jwt(config, token.trim()),
            None => Err(ApiError::invalid_token(
                "Authorization header must use Bearer scheme",
            )),
        };
    }

    Err(ApiError::unauthorized(
        "Authentication required: provide X-API-Key or Authorization header",
    ))
}

// ============================================================================
// TESTS
// ============================================================================
