#![allow(dead_code)]

use tank_api::db::{DbClient, DbConfig};

/// Whether a PostgreSQL instance was provided for this run.
pub fn db_tests_enabled() -> bool {
    std::env::var("DB_TESTS").map(|v| v == "1").unwrap_or(false)
}

pub async fn test_db_client() -> DbClient {
    let client = DbClient::from_config(&DbConfig::from_env())
        .expect("Failed to create database client");
    client
        .ensure_schema()
        .await
        .expect("Failed to create image cache schema");
    client
}
