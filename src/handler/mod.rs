//! Request handler module
//!
//! Routing dispatch plus the route implementations: diagnostic endpoints,
//! home view rendering, and static file serving.

pub mod diagnostics;
pub mod router;
pub mod static_files;
pub mod views;

// Re-export main entry point
pub use router::handle_request;
