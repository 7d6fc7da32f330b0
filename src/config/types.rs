// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub assets: AssetsConfig,
    pub views: ViewsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Session middleware configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Connection string for the MongoDB-backed session store
    pub mongodb_uri: String,
    /// HMAC key used to sign the session cookie
    pub secret: String,
    /// Cookie carrying the session identifier
    pub cookie_name: String,
    /// Session time-to-live in milliseconds, refreshed on every request
    pub ttl_ms: u64,
}

impl SessionConfig {
    /// Cookie `Max-Age` is expressed in whole seconds.
    pub const fn ttl_secs(&self) -> u64 {
        self.ttl_ms / 1000
    }
}

/// Static asset serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directory served for paths no fixed route claims
    pub dir: String,
    /// Cache lifetime in milliseconds for served assets
    pub max_age_ms: u64,
}

impl AssetsConfig {
    /// `Cache-Control: max-age` is expressed in whole seconds.
    pub const fn max_age_secs(&self) -> u64 {
        self.max_age_ms / 1000
    }
}

/// View rendering configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ViewsConfig {
    /// Directory holding HTML views
    pub dir: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, or json)
    pub access_log_format: String,
    /// Access log file path (stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

#[cfg(test)]
impl Config {
    /// A valid configuration for unit tests; no file or environment needed.
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            session: SessionConfig {
                mongodb_uri: "mongodb://localhost:27017/test".to_string(),
                secret: "test-secret".to_string(),
                cookie_name: "sid".to_string(),
                ttl_ms: crate::config::SESSION_TTL_MS,
            },
            assets: AssetsConfig {
                dir: "public".to_string(),
                max_age_ms: crate::config::ASSET_MAX_AGE_MS,
            },
            views: ViewsConfig {
                dir: "views".to_string(),
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
        }
    }
}
