//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache policies, decoupled from
//! routing and from the entry-document logic.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_file_response, build_head_ok_response, build_health_response, build_html_response,
    build_options_response, build_redirect_response, HttpResponse,
};
