//! Entry document handler for `/`, `/app/` and `/app`
//!
//! The document is read from disk on every request so a redeployed bundle
//! or an edited title source is picked up without a restart.
//!
//! States:
//! - document missing  -> 302 to the mount (`/app/`)
//! - document present  -> 200 HTML, title patched when an override exists
//! - read/patch failed -> raw file, unpatched; redirect if even that fails

use std::path::Path;

use hyper::body::Bytes;
use tokio::fs;

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, CachePolicy, HttpResponse};
use crate::logger;
use crate::webapp::error::WebAppError;
use crate::webapp::patch;
use crate::webapp::title::TitleResolver;

/// Which entry route was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRoute {
    /// `/`
    Root,
    /// `/app/` or `/app`
    App,
}

impl EntryRoute {
    /// Match a request path against the entry routes for `mount_path`
    pub fn from_path(path: &str, mount_path: &str) -> Option<Self> {
        if path == "/" {
            return Some(Self::Root);
        }
        let mount = mount_path.trim_end_matches('/');
        if mount.is_empty() {
            return None;
        }
        match path.strip_prefix(mount) {
            Some("" | "/") => Some(Self::App),
            _ => None,
        }
    }

    /// The root must never be served stale from a cache; `/app/` keeps defaults
    pub const fn cache_policy(self) -> Option<CachePolicy> {
        match self {
            Self::Root => Some(CachePolicy::NoStore),
            Self::App => None,
        }
    }
}

/// Serve the entry document for `route`
pub async fn serve_entry(state: &AppState, route: EntryRoute, is_head: bool) -> HttpResponse {
    let index = state.entry_document();
    let redirect_target = mount_redirect_target(&state.config.webapp.mount_path);

    if !fs::try_exists(&index).await.unwrap_or(false) {
        return http::build_redirect_response(&redirect_target);
    }

    match render_entry(&index, &state.title_resolver).await {
        Ok(body) => http::build_html_response(body, route.cache_policy(), is_head),
        Err(e) => {
            logger::log_entry_fallback(&index, &e);
            serve_raw(&index, is_head)
                .await
                .unwrap_or_else(|| http::build_redirect_response(&redirect_target))
        }
    }
}

/// Read the entry document and apply the title override, if any.
///
/// Without an override the bytes are returned untouched.
pub async fn render_entry(index: &Path, resolver: &TitleResolver) -> Result<Bytes, WebAppError> {
    let raw = fs::read(index).await.map_err(|source| WebAppError::PatchIo {
        path: index.to_path_buf(),
        source,
    })?;

    let Some(title) = resolver.resolve_async().await else {
        return Ok(Bytes::from(raw));
    };

    let html = String::from_utf8(raw).map_err(|_| WebAppError::InvalidEncoding {
        path: index.to_path_buf(),
    })?;
    Ok(Bytes::from(patch::patch_for_response(&html, &title)))
}

async fn serve_raw(index: &Path, is_head: bool) -> Option<HttpResponse> {
    let (content, content_type) = static_files::load_single_file(index).await?;
    let etag = http::cache::generate_etag(&content);
    Some(http::build_file_response(
        Bytes::from(content),
        content_type,
        &etag,
        CachePolicy::Revalidate,
        is_head,
    ))
}

/// `/app` -> `/app/`
pub fn mount_redirect_target(mount_path: &str) -> String {
    format!("{}/", mount_path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, WebAppConfig};
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
    use std::collections::HashMap;
    use std::sync::Arc;

    const INDEX: &str = "<!doctype html><html><head><title>Old</title></head><body><div id=\"app\"></div></body></html>";

    fn state(dir: &Path, title: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.webapp = WebAppConfig {
            static_dir: dir.to_path_buf(),
            env_file: None,
            ..WebAppConfig::default()
        };
        let env: HashMap<String, String> = title
            .map(|t| HashMap::from([("WEBAPP_TITLE".to_string(), t.to_string())]))
            .unwrap_or_default();
        let resolver = TitleResolver::with_env(&config.webapp, Arc::new(env));
        AppState::new(config, dir.to_path_buf(), resolver, true)
    }

    async fn body_of(resp: HttpResponse) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[test]
    fn test_entry_route_matching() {
        assert_eq!(EntryRoute::from_path("/", "/app"), Some(EntryRoute::Root));
        assert_eq!(EntryRoute::from_path("/app", "/app"), Some(EntryRoute::App));
        assert_eq!(EntryRoute::from_path("/app/", "/app/"), Some(EntryRoute::App));
        assert_eq!(EntryRoute::from_path("/app/index.html", "/app"), None);
        assert_eq!(EntryRoute::from_path("/apple", "/app"), None);
        assert_eq!(mount_redirect_target("/app"), "/app/");
    }

    #[tokio::test]
    async fn test_missing_document_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), Some("New"));
        for route in [EntryRoute::Root, EntryRoute::App] {
            let resp = serve_entry(&state, route, false).await;
            assert_eq!(resp.status(), 302);
            assert_eq!(resp.headers()[LOCATION], "/app/");
        }
    }

    #[tokio::test]
    async fn test_root_patches_title_and_disables_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        let state = state(dir.path(), Some("New"));

        let resp = serve_entry(&state, EntryRoute::Root, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(
            resp.headers()[CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, max-age=0"
        );

        let body = String::from_utf8(body_of(resp).await).unwrap();
        assert!(body.contains("<title>New</title>"));
        assert!(!body.contains("<title>Old</title>"));
        assert!(body.contains("var t='New';"));
    }

    #[tokio::test]
    async fn test_app_route_has_no_cache_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        let state = state(dir.path(), Some("New"));

        let resp = serve_entry(&state, EntryRoute::App, false).await;
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().get(CACHE_CONTROL).is_none());
        let body = String::from_utf8(body_of(resp).await).unwrap();
        assert!(body.contains("<title>New</title>"));
    }

    #[tokio::test]
    async fn test_no_title_serves_bytes_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        let state = state(dir.path(), None);

        let resp = serve_entry(&state, EntryRoute::Root, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_of(resp).await, INDEX.as_bytes());
    }

    #[tokio::test]
    async fn test_reads_fresh_on_every_request() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        std::fs::write(&index, "<head><title>v1</title></head>").unwrap();
        let state = state(dir.path(), None);

        let first = body_of(serve_entry(&state, EntryRoute::Root, false).await).await;
        std::fs::write(&index, "<head><title>v2</title></head>").unwrap();
        let second = body_of(serve_entry(&state, EntryRoute::Root, false).await).await;

        assert_eq!(first, b"<head><title>v1</title></head>");
        assert_eq!(second, b"<head><title>v2</title></head>");
    }

    #[tokio::test]
    async fn test_non_utf8_document_falls_back_to_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let raw: &[u8] = b"<head><title>\xff</title></head>";
        std::fs::write(dir.path().join("index.html"), raw).unwrap();
        let state = state(dir.path(), Some("New"));

        let err = render_entry(&state.entry_document(), &state.title_resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, WebAppError::InvalidEncoding { .. }));

        let resp = serve_entry(&state, EntryRoute::Root, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body_of(resp).await, raw);
    }

    #[tokio::test]
    async fn test_unreadable_document_redirects() {
        let dir = tempfile::tempdir().unwrap();
        // A directory named index.html exists but cannot be read
        std::fs::create_dir(dir.path().join("index.html")).unwrap();
        let state = state(dir.path(), Some("New"));

        let resp = serve_entry(&state, EntryRoute::Root, false).await;
        assert_eq!(resp.status(), 302);
    }

    #[tokio::test]
    async fn test_head_sends_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        let state = state(dir.path(), Some("New"));

        let resp = serve_entry(&state, EntryRoute::App, true).await;
        assert_eq!(resp.status(), 200);
        assert!(body_of(resp).await.is_empty());
    }
}
