// Configuration module entry point
// Loads the deployment environment contract plus an optional config.toml

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, LoggingConfig, PerformanceConfig, ServerConfig, SessionConfig,
    ViewsConfig,
};

/// Two weeks, the session cookie lifetime.
pub const SESSION_TTL_MS: u64 = 1_209_600_000;

/// Roughly one year, the static asset cache lifetime.
pub const ASSET_MAX_AGE_MS: u64 = 31_557_600_000;

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from("config")
    }

    /// Load configuration from the specified file path (without extension).
    ///
    /// The file is optional; the environment variables `MONGODB_URI`,
    /// `SESSION_SECRET`, `PORT` / `OPENSHIFT_NODEJS_PORT` and
    /// `OPENSHIFT_NODEJS_IP` form the deployment contract and override
    /// anything the file says.
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("session.mongodb_uri", "")?
            .set_default("session.secret", "")?
            .set_default("session.cookie_name", "sid")?
            .set_default("session.ttl_ms", i64::try_from(SESSION_TTL_MS).unwrap_or(i64::MAX))?
            .set_default("assets.dir", "public")?
            .set_default(
                "assets.max_age_ms",
                i64::try_from(ASSET_MAX_AGE_MS).unwrap_or(i64::MAX),
            )?
            .set_default("views.dir", "views")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?;

        if let Ok(uri) = std::env::var("MONGODB_URI") {
            builder = builder.set_override("session.mongodb_uri", uri)?;
        }
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            builder = builder.set_override("session.secret", secret)?;
        }
        if let Some(port) = resolve_port(
            std::env::var("PORT").ok(),
            std::env::var("OPENSHIFT_NODEJS_PORT").ok(),
        ) {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("OPENSHIFT_NODEJS_IP") {
            builder = builder.set_override("server.host", host)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that cannot produce a working server.
    fn validate(&self) -> Result<(), ServerError> {
        if self.session.mongodb_uri.is_empty() {
            return Err(config::ConfigError::Message(
                "MONGODB_URI is required (session store connection string)".to_string(),
            )
            .into());
        }
        if self.session.secret.is_empty() {
            return Err(config::ConfigError::Message(
                "SESSION_SECRET is required (session cookie signing key)".to_string(),
            )
            .into());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|source| ServerError::Address {
            addr,
            source,
        })
    }
}

/// `PORT` wins over `OPENSHIFT_NODEJS_PORT` when both are set.
fn resolve_port(port: Option<String>, openshift_port: Option<String>) -> Option<String> {
    port.or(openshift_port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_precedence() {
        assert_eq!(
            resolve_port(Some("8080".to_string()), Some("9090".to_string())),
            Some("8080".to_string())
        );
        assert_eq!(
            resolve_port(None, Some("9090".to_string())),
            Some("9090".to_string())
        );
        assert_eq!(resolve_port(None, None), None);
    }

    #[test]
    fn test_validate_requires_contract_vars() {
        let mut cfg = Config::for_tests();
        cfg.session.mongodb_uri = String::new();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::for_tests();
        cfg.session.secret = String::new();
        assert!(cfg.validate().is_err());

        assert!(Config::for_tests().validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::for_tests();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3000;
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:3000");

        cfg.server.host = "not an ip".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
