//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `ImageCacheStore` implementation backed by the `tank_image_cache` table.
//!
//! All values reach the database as bind parameters. The only text spliced
//! into SQL is the ORDER BY list, built from the fixed column names of
//! `SortField`.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use std::fmt::Display;
use std::time::Duration;
use tank_core::{ImageCache, Page, SortSpec, StorageError, TankError, TankResult};
use tank_storage::{ImageCacheQuery, ImageCacheStore};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

const TABLE: &str = "tank_image_cache";

const COLUMNS: &str = "uuid, sort, user_uuid, username, matter_uuid, matter_name, mode, size, \
                       path, create_time, update_time";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tank_image_cache (
    uuid         TEXT PRIMARY KEY,
    sort         BIGINT NOT NULL DEFAULT 0,
    user_uuid    TEXT NOT NULL CHECK (user_uuid <> ''),
    username     TEXT NOT NULL DEFAULT '',
    matter_uuid  TEXT NOT NULL,
    matter_name  TEXT NOT NULL DEFAULT '',
    mode         TEXT NOT NULL DEFAULT '',
    size         BIGINT NOT NULL DEFAULT 0,
    path         TEXT NOT NULL DEFAULT '',
    create_time  TIMESTAMPTZ NOT NULL DEFAULT now(),
    update_time  TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_tank_image_cache_owner_matter
    ON tank_image_cache (user_uuid, matter_uuid);
"#;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// How long a request waits for a free connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "tank".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("TANK_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TANK_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("TANK_DB_NAME").unwrap_or_else(|_| "tank".to_string()),
            user: std::env::var("TANK_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("TANK_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("TANK_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("TANK_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size.max(1));
        pool_config.timeouts = Timeouts {
            wait: Some(self.timeout),
            ..Timeouts::default()
        };
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Pooled PostgreSQL client. Implements `ImageCacheStore`.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl std::fmt::Debug for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbClient")
            .field("pool_size", &self.pool_size())
            .finish()
    }
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Verify connectivity with a trivial query.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    /// Create the image cache table and its owner index if missing.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!(table = TABLE, "Image cache schema ready");
        Ok(())
    }

    async fn store_conn(&self) -> TankResult<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| backend_error("acquire connection", e))
    }
}

// ============================================================================
// IMAGE CACHE STORE
// ============================================================================

#[async_trait]
impl ImageCacheStore for DbClient {
    async fn find_by_uuid(&self, uuid: &str) -> TankResult<Option<ImageCache>> {
        let conn = self.store_conn().await?;
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE uuid = $1");

        let row = conn
            .query_opt(&sql, &[&uuid])
            .await
            .map_err(|e| backend_error("find image cache", e))?;

        row.as_ref().map(row_to_image_cache).transpose()
    }

    async fn page(&self, query: &ImageCacheQuery) -> TankResult<Page<ImageCache>> {
        let conn = self.store_conn().await?;

        let user_uuid = query.user_uuid().to_string();
        let matter_uuid = query.matter_uuid().map(str::to_string);
        let pagination = query.pagination();
        let limit = pagination.limit();
        let offset = pagination.offset();

        let mut filter = String::from("user_uuid = $1");
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&user_uuid];
        if let Some(matter) = &matter_uuid {
            params.push(matter);
            filter.push_str(&format!(" AND matter_uuid = ${}", params.len()));
        }

        let count_sql = format!("SELECT COUNT(*) FROM {TABLE} WHERE {filter}");
        let total: i64 = conn
            .query_one(&count_sql, &params)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(|e| backend_error("count image caches", e))?;

        let select_sql = format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE {filter} ORDER BY {} LIMIT ${} OFFSET ${}",
            order_by_clause(query.sort()),
            params.len() + 1,
            params.len() + 2,
        );
        params.push(&limit);
        params.push(&offset);

        let rows = conn
            .query(&select_sql, &params)
            .await
            .map_err(|e| backend_error("list image caches", e))?;

        let data = rows
            .iter()
            .map(row_to_image_cache)
            .collect::<TankResult<Vec<_>>>()?;

        Ok(Page::new(pagination, total, data))
    }

    async fn delete(&self, cache: &ImageCache) -> TankResult<bool> {
        let conn = self.store_conn().await?;
        let sql = format!("DELETE FROM {TABLE} WHERE uuid = $1");

        let removed = conn
            .execute(&sql, &[&cache.uuid])
            .await
            .map_err(|e| backend_error("delete image cache", e))?;

        Ok(removed > 0)
    }

    async fn insert(&self, cache: &ImageCache) -> TankResult<()> {
        let conn = self.store_conn().await?;
        let sql = format!(
            "INSERT INTO {TABLE} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        );

        conn.execute(
            &sql,
            &[
                &cache.uuid,
                &cache.sort,
                &cache.user_uuid,
                &cache.username,
                &cache.matter_uuid,
                &cache.matter_name,
                &cache.mode,
                &cache.size,
                &cache.path,
                &cache.create_time,
                &cache.update_time,
            ],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                TankError::from(StorageError::InsertFailed {
                    uuid: cache.uuid.clone(),
                    reason: "already exists".to_string(),
                })
            } else {
                backend_error("insert image cache", e)
            }
        })?;

        Ok(())
    }
}

/// ORDER BY list for `sort`, always ending in the `uuid` tie-breaker.
pub fn order_by_clause(sort: &SortSpec) -> String {
    let mut terms: Vec<String> = sort
        .terms()
        .into_iter()
        .map(|(field, direction)| format!("{} {}", field.column(), direction.as_sql()))
        .collect();
    terms.push("uuid ASC".to_string());
    terms.join(", ")
}

fn row_to_image_cache(row: &Row) -> TankResult<ImageCache> {
    let decode = |e: tokio_postgres::Error| backend_error("decode image cache row", e);

    Ok(ImageCache {
        uuid: row.try_get("uuid").map_err(decode)?,
        sort: row.try_get("sort").map_err(decode)?,
        user_uuid: row.try_get("user_uuid").map_err(decode)?,
        username: row.try_get("username").map_err(decode)?,
        matter_uuid: row.try_get("matter_uuid").map_err(decode)?,
        matter_name: row.try_get("matter_name").map_err(decode)?,
        mode: row.try_get("mode").map_err(decode)?,
        size: row.try_get("size").map_err(decode)?,
        path: row.try_get("path").map_err(decode)?,
        create_time: row.try_get("create_time").map_err(decode)?,
        update_time: row.try_get("update_time").map_err(decode)?,
    })
}

/// Log the driver error and return an opaque backend error.
fn backend_error(operation: &str, err: impl Display) -> TankError {
    tracing::error!(operation, error = %err, "Image cache store failure");
    TankError::backend(format!("{} failed", operation))
}
