//! Image Cache REST API Routes
//!
//! Each endpoint accepts GET with a query string or POST with a urlencoded
//! form body. Handlers only translate between HTTP and `ImageCacheService`.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::{
    error::{ApiError, ApiResult},
    extractors::FormParams,
    middleware::AuthExtractor,
    services::ImageCacheService,
    state::AppState,
    types::{
        DeleteImageCacheResponse, ImageCachePageResponse, PageParams, UuidParams, UuidsParams,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET|POST /api/image/cache/detail - Fetch one of the caller's image caches
#[utoipa::path(
    get,
    path = "/api/image/cache/detail",
    tag = "Image Cache",
    params(
        ("uuid" = String, Query, description = "Image cache uuid"),
    ),
    responses(
        (status = 200, description = "Image cache details", body = tank_core::ImageCache),
        (status = 400, description = "Missing uuid", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Image cache not found", body = ApiError),
    ),
    security(
        ("api_key" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn detail(
    State(service): State<ImageCacheService>,
    AuthExtractor(auth): AuthExtractor,
    FormParams(params): FormParams<UuidParams>,
) -> ApiResult<impl IntoResponse> {
    let uuid = params.uuid.unwrap_or_default();
    let cache = service.detail(&uuid, &auth.acting_user()).await?;
    Ok(Json(cache))
}

/// GET|POST /api/image/cache/page - List the caller's image caches
#[utoipa::path(
    get,
    path = "/api/image/cache/page",
    tag = "Image Cache",
    params(
        ("page" = Option<i64>, Query, description = "Zero-based page number"),
        ("pageSize" = Option<i64>, Query, description = "Page size, default 200"),
        ("matterUuid" = Option<String>, Query, description = "Restrict to one matter"),
        ("orderCreateTime" = Option<String>, Query, description = "ASC or DESC"),
        ("orderUpdateTime" = Option<String>, Query, description = "ASC or DESC"),
        ("orderSort" = Option<String>, Query, description = "ASC or DESC"),
        ("orderSize" = Option<String>, Query, description = "ASC or DESC"),
    ),
    responses(
        (status = 200, description = "One page of image caches", body = ImageCachePageResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("api_key" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn page(
    State(service): State<ImageCacheService>,
    AuthExtractor(auth): AuthExtractor,
    FormParams(params): FormParams<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = service.page(&params, &auth.acting_user()).await?;
    Ok(Json(ImageCachePageResponse::from(page)))
}

/// GET|POST /api/image/cache/delete - Delete one of the caller's image caches
#[utoipa::path(
    post,
    path = "/api/image/cache/delete",
    tag = "Image Cache",
    request_body(content = UuidParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Image cache deleted", body = DeleteImageCacheResponse),
        (status = 400, description = "Missing uuid", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Image cache not found", body = ApiError),
    ),
    security(
        ("api_key" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    State(service): State<ImageCacheService>,
    AuthExtractor(auth): AuthExtractor,
    FormParams(params): FormParams<UuidParams>,
) -> ApiResult<impl IntoResponse> {
    let uuid = params.uuid.unwrap_or_default();
    service.delete(&uuid, &auth.acting_user()).await?;
    Ok(Json(DeleteImageCacheResponse { deleted: 1 }))
}

/// GET|POST /api/image/cache/delete/batch - Delete several image caches in order
///
/// Stops at the first id that is missing or foreign; earlier deletions stay.
#[utoipa::path(
    post,
    path = "/api/image/cache/delete/batch",
    tag = "Image Cache",
    request_body(content = UuidsParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "All listed image caches deleted", body = DeleteImageCacheResponse),
        (status = 400, description = "Empty list or empty entry", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "An entry belongs to another user", body = ApiError),
        (status = 404, description = "An entry does not exist", body = ApiError),
    ),
    security(
        ("api_key" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn delete_batch(
    State(service): State<ImageCacheService>,
    AuthExtractor(auth): AuthExtractor,
    FormParams(params): FormParams<UuidsParams>,
) -> ApiResult<impl IntoResponse> {
    let uuids = params.uuids.unwrap_or_default();
    let deleted = service.delete_batch(&uuids, &auth.acting_user()).await?;
    Ok(Json(DeleteImageCacheResponse { deleted }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Image cache routes. Auth layers are applied by the caller.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/detail", get(detail).post(detail))
        .route("/page", get(page).post(page))
        .route("/delete", get(delete).post(delete))
        .route("/delete/batch", get(delete_batch).post(delete_batch))
}
