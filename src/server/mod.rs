// Server module entry point
// Listener setup, per-connection serving, accept loop and shutdown signals

pub mod accept;
pub mod connection;
pub mod listener;
pub mod signal;

// Re-export commonly used items
pub use accept::run_server;
pub use listener::create_reusable_listener;
