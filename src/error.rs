//! Server error taxonomy
//!
//! One error type covers the whole request path. Per-request failures are
//! terminal to that request only: the router catches them centrally, logs,
//! and answers 500. `ShutdownRequested` is not a failure; it is how the
//! `/kill` route aborts its own connection while the lifecycle manager
//! tears the process down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("session store error: {0}")]
    SessionStore(#[from] mongodb::error::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("view '{0}' could not be rendered")]
    ViewRender(String),

    #[error("shutdown requested")]
    ShutdownRequested,
}
