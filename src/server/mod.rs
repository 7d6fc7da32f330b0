// Server module entry
// Listener creation, connection handling, and process lifecycle

pub mod connection;
pub mod lifecycle;
pub mod listener;

// Rust does not allow `loop` as a module name (keyword), use server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use lifecycle::{start_signal_handler, Lifecycle};
pub use listener::create_listener;
pub use server_loop::run;
