//! OpenAPI Specification for the Tank API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::types::{
    DeleteImageCacheResponse, ImageCachePageResponse, PageParams, UuidParams, UuidsParams,
};

use crate::routes::{health, image_cache};

use tank_core::{ImageCache, SortDirection, UserRole};

/// OpenAPI document for the Tank API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tank API",
        version = "0.1.0",
        description = "Access-controlled image cache records of the Tank file store",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Image Cache", description = "Cached renditions of the caller's files"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Image Cache Routes ===
        image_cache::detail,
        image_cache::page,
        image_cache::delete,
        image_cache::delete_batch,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError,
            ErrorCode,

            // === Domain Types ===
            ImageCache,
            UserRole,
            SortDirection,

            // === Request/Response Types ===
            UuidParams,
            UuidsParams,
            PageParams,
            ImageCachePageResponse,
            DeleteImageCacheResponse,

            // === Health Types ===
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
