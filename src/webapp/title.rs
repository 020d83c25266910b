//! Page title resolution
//!
//! The effective title comes from the first source yielding a non-empty value:
//! process env (`WEBAPP_TITLE`, `SITE_NAME`), then the `[webapp]` config section
//! (`title`, `site_name`), then an env file scanned for the same two keys.
//! Sources are re-read on every call so edits take effect without a restart.

use crate::config::WebAppConfig;
use crate::logger;
use crate::webapp::error::WebAppError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Keys accepted in the process environment and the env file, highest priority first
pub const TITLE_KEYS: [&str; 2] = ["WEBAPP_TITLE", "SITE_NAME"];

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[allow(clippy::implicit_hasher)]
impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

pub struct TitleResolver {
    env: Arc<dyn EnvSource>,
    config_title: Option<String>,
    config_site_name: Option<String>,
    env_file: Option<PathBuf>,
}

impl TitleResolver {
    /// Resolver backed by the process environment
    pub fn new(webapp: &WebAppConfig) -> Self {
        Self::with_env(webapp, Arc::new(ProcessEnv))
    }

    pub fn with_env(webapp: &WebAppConfig, env: Arc<dyn EnvSource>) -> Self {
        Self {
            env,
            config_title: webapp.title.clone(),
            config_site_name: webapp.site_name.clone(),
            env_file: webapp.env_file.clone(),
        }
    }

    /// Returns the title override, or `None` when no source provides one
    pub fn resolve(&self) -> Option<String> {
        self.from_env()
            .or_else(|| self.from_config())
            .or_else(|| self.from_env_file())
    }

    /// Same lookup as `resolve`, reading the env file through `tokio::fs`
    pub async fn resolve_async(&self) -> Option<String> {
        if let Some(title) = self.from_env().or_else(|| self.from_config()) {
            return Some(title);
        }
        let path = self.env_file.as_deref()?;
        match read_env_file_title_async(path).await {
            Ok(title) => title,
            Err(e) => {
                logger::log_debug(&format!("Ignoring env file title lookup: {e}"));
                None
            }
        }
    }

    fn from_env(&self) -> Option<String> {
        TITLE_KEYS
            .iter()
            .find_map(|key| self.env.var(key).as_deref().and_then(clean_value))
    }

    fn from_config(&self) -> Option<String> {
        [&self.config_title, &self.config_site_name]
            .into_iter()
            .flatten()
            .find_map(|v| clean_value(v))
    }

    fn from_env_file(&self) -> Option<String> {
        let path = self.env_file.as_deref()?;
        match read_env_file_title(path) {
            Ok(title) => title,
            Err(e) => {
                logger::log_debug(&format!("Ignoring env file title lookup: {e}"));
                None
            }
        }
    }
}

/// Scan an env file for `WEBAPP_TITLE` / `SITE_NAME`.
///
/// A missing file is not an error. Blank lines, `#` comments and lines
/// without `=` are skipped. `WEBAPP_TITLE` wins over `SITE_NAME` regardless
/// of line order; within one key the first usable line wins.
pub fn read_env_file_title(path: &Path) -> Result<Option<String>, WebAppError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_env_title(&content)),
        Err(e) => absent_or_malformed(path, e),
    }
}

/// Async variant of `read_env_file_title` for the request path
pub async fn read_env_file_title_async(path: &Path) -> Result<Option<String>, WebAppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(parse_env_title(&content)),
        Err(e) => absent_or_malformed(path, e),
    }
}

fn absent_or_malformed(path: &Path, source: io::Error) -> Result<Option<String>, WebAppError> {
    if source.kind() == io::ErrorKind::NotFound {
        return Ok(None);
    }
    Err(WebAppError::MalformedEnvFile {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_env_title(content: &str) -> Option<String> {
    let mut found: [Option<String>; 2] = [None, None];
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if let Some(slot) = TITLE_KEYS.iter().position(|k| *k == key) {
            if found[slot].is_none() {
                found[slot] = clean_value(value);
            }
        }
    }

    let [title, site_name] = found;
    title.or(site_name)
}

/// Trim whitespace, then surrounding `"` and `'` characters.
/// Returns `None` if nothing is left.
pub fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('"').trim_matches('\'');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn webapp(title: Option<&str>, site_name: Option<&str>, env_file: Option<PathBuf>) -> WebAppConfig {
        WebAppConfig {
            title: title.map(ToString::to_string),
            site_name: site_name.map(ToString::to_string),
            env_file,
            ..WebAppConfig::default()
        }
    }

    fn env(pairs: &[(&str, &str)]) -> Arc<dyn EnvSource> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn env_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_beats_config() {
        let resolver = TitleResolver::with_env(
            &webapp(Some("B"), None, None),
            env(&[("WEBAPP_TITLE", "A")]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("A"));
    }

    #[test]
    fn test_env_key_order() {
        let resolver = TitleResolver::with_env(
            &webapp(None, None, None),
            env(&[("SITE_NAME", "Site"), ("WEBAPP_TITLE", "App")]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("App"));

        let resolver =
            TitleResolver::with_env(&webapp(None, None, None), env(&[("SITE_NAME", "Site")]));
        assert_eq!(resolver.resolve().as_deref(), Some("Site"));
    }

    #[test]
    fn test_blank_env_falls_through_to_config() {
        let resolver = TitleResolver::with_env(
            &webapp(None, Some("From Config"), None),
            env(&[("WEBAPP_TITLE", "  \"\"  ")]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("From Config"));
    }

    #[test]
    fn test_config_title_beats_site_name() {
        let resolver =
            TitleResolver::with_env(&webapp(Some("Title"), Some("Site"), None), env(&[]));
        assert_eq!(resolver.resolve().as_deref(), Some("Title"));
    }

    #[test]
    fn test_env_file_fallback() {
        let file = env_file("# comment\n\nFOO=bar\nSITE_NAME=Site\nWEBAPP_TITLE=\"Quoted Title\"\n");
        let resolver = TitleResolver::with_env(
            &webapp(None, None, Some(file.path().to_path_buf())),
            env(&[]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("Quoted Title"));
    }

    #[test]
    fn test_config_title_beats_env_file() {
        let file = env_file("WEBAPP_TITLE=File\n");
        let resolver = TitleResolver::with_env(
            &webapp(Some("Cfg"), None, Some(file.path().to_path_buf())),
            env(&[]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("Cfg"));
    }

    #[test]
    fn test_config_site_name_beats_env_file() {
        let file = env_file("WEBAPP_TITLE=File\nSITE_NAME=FileSite\n");
        let resolver = TitleResolver::with_env(
            &webapp(None, Some("Cfg Site"), Some(file.path().to_path_buf())),
            env(&[]),
        );
        assert_eq!(resolver.resolve().as_deref(), Some("Cfg Site"));
    }

    #[tokio::test]
    async fn test_async_lookup_follows_same_precedence() {
        let file = env_file("SITE_NAME=FileSite\n");
        let path = Some(file.path().to_path_buf());

        let resolver = TitleResolver::with_env(&webapp(None, None, path.clone()), env(&[]));
        assert_eq!(resolver.resolve_async().await.as_deref(), Some("FileSite"));

        let resolver = TitleResolver::with_env(&webapp(Some("Cfg"), None, path.clone()), env(&[]));
        assert_eq!(resolver.resolve_async().await.as_deref(), Some("Cfg"));

        let resolver = TitleResolver::with_env(
            &webapp(Some("Cfg"), None, path),
            env(&[("WEBAPP_TITLE", "Env")]),
        );
        assert_eq!(resolver.resolve_async().await.as_deref(), Some("Env"));
    }

    #[tokio::test]
    async fn test_async_read_handles_missing_and_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            read_env_file_title_async(&dir.path().join("missing.env")).await.unwrap(),
            None
        );
        assert!(read_env_file_title_async(dir.path()).await.is_err());
    }

    #[test]
    fn test_env_file_skips_malformed_and_empty_lines() {
        let file = env_file("WEBAPP_TITLE\nWEBAPP_TITLE=''\n  SITE_NAME = 'My Site'  \n");
        assert_eq!(
            read_env_file_title(file.path()).unwrap().as_deref(),
            Some("My Site")
        );
    }

    #[test]
    fn test_env_file_keys_are_case_sensitive() {
        let file = env_file("webapp_title=lower\n");
        assert_eq!(read_env_file_title(file.path()).unwrap(), None);
    }

    #[test]
    fn test_missing_env_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TitleResolver::with_env(
            &webapp(None, None, Some(dir.path().join("missing.env"))),
            env(&[]),
        );
        assert_eq!(resolver.resolve(), None);
    }

    #[test]
    fn test_unreadable_env_file_is_absent() {
        // A directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        assert!(read_env_file_title(dir.path()).is_err());
        let resolver = TitleResolver::with_env(
            &webapp(None, None, Some(dir.path().to_path_buf())),
            env(&[]),
        );
        assert_eq!(resolver.resolve(), None);
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  \"Hello\" ").as_deref(), Some("Hello"));
        assert_eq!(clean_value("'Hi'").as_deref(), Some("Hi"));
        assert_eq!(clean_value("\"'nested'\"").as_deref(), Some("nested"));
        assert_eq!(clean_value("   "), None);
        assert_eq!(clean_value("\"\""), None);
    }
}
