//! Request handler module
//!
//! Routes requests to the entry document handler, the static mount, or the
//! built-in probes.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
