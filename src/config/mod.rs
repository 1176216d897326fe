use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Prepended to every cache key so one Redis can serve several deployments.
    pub key_prefix: String,
    /// TTL for cached list responses, in seconds.
    pub list_ttl_secs: u64,
    /// When unset the service runs on the in-process cache.
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_KEY_PREFIX") {
            self.cache.key_prefix = v;
        }
        if let Ok(v) = env::var("CACHE_LIST_TTL_SECS") {
            self.cache.list_ttl_secs = v.parse().unwrap_or(self.cache.list_ttl_secs);
        }
        if let Ok(v) = env::var("REDIS_URL") {
            if !v.is_empty() {
                self.cache.redis_url = Some(v);
            }
        }

        // HTTP overrides; DEVASSETS_API_PORT wins over the generic PORT
        if let Ok(v) = env::var("DEVASSETS_API_PORT").or_else(|_| env::var("PORT")) {
            self.http.port = v.parse().unwrap_or(self.http.port);
        }
        if let Ok(v) = env::var("HTTP_CORS_ORIGINS") {
            self.http.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("HTTP_ENABLE_REQUEST_LOGGING") {
            self.http.enable_request_logging =
                v.parse().unwrap_or(self.http.enable_request_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            cache: CacheConfig {
                key_prefix: "devassets:".to_string(),
                list_ttl_secs: 60 * 15,
                redis_url: None,
            },
            http: HttpConfig {
                port: 3000,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                enable_request_logging: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            cache: CacheConfig {
                key_prefix: "devassets:".to_string(),
                list_ttl_secs: 60 * 15,
                redis_url: None,
            },
            http: HttpConfig {
                port: 3000,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_request_logging: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            cache: CacheConfig {
                key_prefix: "devassets:".to_string(),
                list_ttl_secs: 60 * 15,
                redis_url: None,
            },
            http: HttpConfig {
                port: 3000,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_request_logging: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
