// Application state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;

use super::types::Config;
use crate::webapp::TitleResolver;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Absolute path of the SPA bundle
    pub static_dir: PathBuf,
    /// Whether `/app/*` is served from `static_dir`
    pub static_mounted: bool,
    pub title_resolver: TitleResolver,
}

impl AppState {
    pub fn new(
        config: Config,
        static_dir: PathBuf,
        title_resolver: TitleResolver,
        static_mounted: bool,
    ) -> Self {
        Self {
            config,
            static_dir,
            static_mounted,
            title_resolver,
        }
    }

    /// `<static_dir>/index.html`
    pub fn entry_document(&self) -> PathBuf {
        self.static_dir.join(crate::webapp::ENTRY_DOCUMENT)
    }
}
