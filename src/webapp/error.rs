//! Failure kinds of the entry-document subsystem
//!
//! Every variant is recoverable: callers log it and degrade
//! (patched -> unpatched -> redirect) instead of failing the request.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebAppError {
    /// Static directory or entry document missing/unreadable
    #[error("filesystem unavailable at {}: {source}", path.display())]
    FilesystemUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write failure while installing the patch, or read failure while serving
    #[error("patch i/o failed on {}: {source}", path.display())]
    PatchIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Entry document is not valid UTF-8 and cannot be rewritten as text
    #[error("entry document {} is not valid UTF-8", path.display())]
    InvalidEncoding { path: PathBuf },

    /// Env file could not be read
    #[error("env file {} unreadable: {source}", path.display())]
    MalformedEnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
