//! Mini-App entry document subsystem
//!
//! Resolves the page title, rewrites `index.html` once on disk at startup and
//! again per request for the entry routes.

pub mod error;
pub mod install;
pub mod patch;
pub mod serve;
pub mod title;

pub use install::{run_install, InstallOutcome, ENTRY_DOCUMENT};
pub use serve::{serve_entry, EntryRoute};
pub use title::TitleResolver;
