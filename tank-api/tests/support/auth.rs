#![allow(dead_code)]

use tank_api::auth::{generate_jwt_token, AuthConfig, AuthContext, AuthMethod, JwtSecret};
use tank_core::UserRole;

pub const ALICE: &str = "alice";
pub const ALICE_KEY: &str = "alice_key_123";
pub const BOB: &str = "bob";
pub const BOB_KEY: &str = "bob_key_456";

/// Two API-key users and a known JWT secret.
pub fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.add_api_key(ALICE_KEY, ALICE);
    config.add_api_key(BOB_KEY, BOB);
    config.jwt_secret = JwtSecret::new("test_secret_for_route_tests".to_string())
        .expect("Test secret should be valid");
    config
}

/// `Authorization` header value for a fresh token.
pub fn bearer(user_uuid: &str, role: UserRole) -> String {
    let token = generate_jwt_token(&test_auth_config(), user_uuid, user_uuid, role)
        .expect("Token generation should succeed");
    format!("Bearer {}", token)
}

pub fn test_auth_context(user_uuid: &str) -> AuthContext {
    AuthContext::new(user_uuid, format!("{user_uuid}-name"), UserRole::User, AuthMethod::Jwt)
}
