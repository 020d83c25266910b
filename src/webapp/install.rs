//! One-time on-disk title patch
//!
//! Runs before the static mount starts serving, so `/app/index.html` fetched
//! straight from disk already carries the title. Only the title rule is
//! applied here; the runtime script is added per request by the entry handler.

use crate::logger;
use crate::webapp::error::WebAppError;
use crate::webapp::patch;
use crate::webapp::title::TitleResolver;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub const ENTRY_DOCUMENT: &str = "index.html";
pub const BACKUP_DOCUMENT: &str = "index.html.bak";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No title source configured
    NoOverride,
    /// Static directory has no entry document
    DocumentMissing,
    /// Entry document already carries the title
    Unchanged,
    /// Entry document rewritten; `backup_created` is false when a backup already existed
    Patched { backup_created: bool },
}

impl InstallOutcome {
    pub const fn rewritten(self) -> bool {
        matches!(self, Self::Patched { .. })
    }
}

/// Resolve the title and patch `<static_dir>/index.html` in place
pub fn install(static_dir: &Path, resolver: &TitleResolver) -> Result<InstallOutcome, WebAppError> {
    match resolver.resolve() {
        Some(title) => install_title(static_dir, &title),
        None => Ok(InstallOutcome::NoOverride),
    }
}

/// Patch the entry document with an explicit title.
///
/// The pre-patch content goes to `index.html.bak` only if no backup exists yet,
/// so restarts never replace the true original with a patched copy.
pub fn install_title(static_dir: &Path, title: &str) -> Result<InstallOutcome, WebAppError> {
    if !static_dir.is_dir() {
        return Err(WebAppError::FilesystemUnavailable {
            path: static_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "static directory not found"),
        });
    }

    let index = static_dir.join(ENTRY_DOCUMENT);
    if !index.is_file() {
        return Ok(InstallOutcome::DocumentMissing);
    }

    let bytes = fs::read(&index).map_err(|source| WebAppError::FilesystemUnavailable {
        path: index.clone(),
        source,
    })?;
    let original =
        String::from_utf8(bytes).map_err(|_| WebAppError::InvalidEncoding { path: index.clone() })?;

    let result = patch::patch(&original, title);
    if !result.changed {
        return Ok(InstallOutcome::Unchanged);
    }

    // No backup, no overwrite
    let backup_created = write_backup_once(&static_dir.join(BACKUP_DOCUMENT), &original)?;

    fs::write(&index, result.html).map_err(|source| WebAppError::PatchIo {
        path: index.clone(),
        source,
    })?;

    Ok(InstallOutcome::Patched { backup_created })
}

/// Run the installer and log the outcome. Never fails; returns whether the
/// entry document was rewritten.
pub fn run_install(static_dir: &Path, resolver: &TitleResolver) -> bool {
    match install(static_dir, resolver) {
        Ok(outcome) => {
            logger::log_title_install(static_dir, outcome);
            outcome.rewritten()
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Title pre-patch skipped, static files served unpatched: {e}"
            ));
            false
        }
    }
}

/// Write `content` to `path` unless a complete backup already exists.
///
/// The bytes land in a sibling temp file first and are hard-linked into place,
/// which fails instead of replacing an existing backup. A crash mid-write can
/// therefore only leave the temp file behind, never a truncated backup. An
/// existing zero-length backup is an incomplete one and gets replaced.
fn write_backup_once(path: &Path, content: &str) -> Result<bool, WebAppError> {
    let patch_io = |source| WebAppError::PatchIo {
        path: path.to_path_buf(),
        source,
    };

    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 || content.is_empty() => return Ok(false),
        Ok(_) => {
            logger::log_warning(&format!(
                "Replacing empty backup left by an interrupted install: {}",
                path.display()
            ));
            fs::remove_file(path).map_err(patch_io)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(patch_io(e)),
    }

    let tmp = path.with_extension("bak.tmp");
    let staged = write_synced(&tmp, content).and_then(|()| fs::hard_link(&tmp, path));
    // The temp file is never needed past this point
    let _ = fs::remove_file(&tmp);

    match staged {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(patch_io(e)),
    }
}

fn write_synced(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
