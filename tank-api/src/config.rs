//! API Configuration Module
//!
//! CORS, request timeout, paging limits and backend selection. Loaded from
//! environment variables with development defaults.

use std::path::PathBuf;
use std::time::Duration;

use tank_core::{PagingSettings, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Where image cache records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local map; contents are lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins. Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Request Handling
    // ========================================================================
    /// Upper bound on handling time for one request.
    pub request_timeout: Duration,

    /// Page size used when the caller gives none, and the clamp applied to
    /// the ones they give.
    pub paging: PagingSettings,

    // ========================================================================
    // Backends
    // ========================================================================
    pub store_backend: StoreBackend,

    /// Directory cached renditions live under. `None` leaves files alone.
    pub artifact_root: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            request_timeout: Duration::from_secs(30),
            paging: PagingSettings::default(),
            store_backend: StoreBackend::default(),
            artifact_root: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `TANK_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `TANK_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `TANK_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `TANK_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `TANK_DEFAULT_PAGE_SIZE`: Page size when none is given (default: 200)
    /// - `TANK_MAX_PAGE_SIZE`: Largest page size served (default: 1000)
    /// - `TANK_STORE`: "postgres" or "memory" (default: postgres)
    /// - `TANK_ARTIFACT_ROOT`: Directory holding cached renditions
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("TANK_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("TANK_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = env_parse("TANK_CORS_MAX_AGE_SECS").unwrap_or(86400);

        let request_timeout =
            Duration::from_secs(env_parse("TANK_REQUEST_TIMEOUT_SECS").unwrap_or(30));

        let max_page_size = env_parse::<i64>("TANK_MAX_PAGE_SIZE")
            .filter(|n| *n >= 1)
            .unwrap_or(MAX_PAGE_SIZE);
        let default_page_size = env_parse::<i64>("TANK_DEFAULT_PAGE_SIZE")
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size);

        let store_backend = match std::env::var("TANK_STORE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Falling back to the postgres store");
                StoreBackend::Postgres
            }),
            Err(_) => StoreBackend::default(),
        };

        let artifact_root = std::env::var("TANK_ARTIFACT_ROOT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            request_timeout,
            paging: PagingSettings {
                default_page_size,
                max_page_size,
            },
            store_backend,
            artifact_root,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    ///
    /// `*.example.com` matches any https sub-domain of `example.com` and the
    /// bare domain itself.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            match (allowed.strip_prefix("*."), origin.strip_prefix("https://")) {
                (Some(domain), Some(host)) => {
                    host == domain
                        || host
                            .strip_suffix(domain)
                            .map_or(false, |sub| sub.ends_with('.'))
                }
                _ => false,
            }
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.as_deref() {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.paging.default_page_size, 200);
        assert_eq!(config.paging.max_page_size, 1000);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert!(config.artifact_root.is_none());
    }

    #[test]
    fn test_from_env() {
        let _lock = ENV_MUTEX.lock().expect("env mutex should not be poisoned");
        let _store = EnvVarGuard::set("TANK_STORE", Some("Memory"));
        let _max = EnvVarGuard::set("TANK_MAX_PAGE_SIZE", Some("50"));
        let _default = EnvVarGuard::set("TANK_DEFAULT_PAGE_SIZE", Some("80"));
        let _root = EnvVarGuard::set("TANK_ARTIFACT_ROOT", Some("/srv/tank"));
        let _timeout = EnvVarGuard::set("TANK_REQUEST_TIMEOUT_SECS", Some("5"));

        let config = ApiConfig::from_env();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.paging.max_page_size, 50);
        assert_eq!(config.paging.default_page_size, 50);
        assert_eq!(config.artifact_root, Some(PathBuf::from("/srv/tank")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_ignores_bad_values() {
        let _lock = ENV_MUTEX.lock().expect("env mutex should not be poisoned");
        let _store = EnvVarGuard::set("TANK_STORE", Some("redis"));
        let _max = EnvVarGuard::set("TANK_MAX_PAGE_SIZE", Some("0"));
        let _default = EnvVarGuard::set("TANK_DEFAULT_PAGE_SIZE", Some("lots"));

        let config = ApiConfig::from_env();
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.paging.max_page_size, MAX_PAGE_SIZE);
        assert_eq!(config.paging.default_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_is_production() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());

        config.cors_origins = vec!["https://tank.example".to_string()];
        assert!(config.is_production());
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: vec!["https://tank.example".to_string()],
            ..Default::default()
        };

        assert!(config.is_origin_allowed("https://tank.example"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let config = ApiConfig {
            cors_origins: vec!["*.tank.example".to_string()],
            ..Default::default()
        };

        assert!(config.is_origin_allowed("https://app.tank.example"));
        assert!(config.is_origin_allowed("https://tank.example"));
        assert!(!config.is_origin_allowed("https://nottank.example"));
        assert!(!config.is_origin_allowed("http://app.tank.example"));
    }
}
