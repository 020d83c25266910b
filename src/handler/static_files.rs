//! Static mount module
//!
//! Serves the SPA bundle under the mount path (`/app/*`) straight from disk,
//! including the pre-patched `index.html`. No per-request rewriting happens here.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, CachePolicy, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A file resolved inside the static directory
#[derive(Debug)]
pub struct StaticFile {
    pub content: Vec<u8>,
    pub content_type: &'static str,
    /// Path relative to the static directory, used for cache policy
    pub relative: PathBuf,
}

/// Serve a request under the mount path
pub async fn serve_mount(
    ctx: &RequestContext<'_>,
    static_dir: &Path,
    mount_path: &str,
    index_files: &[String],
) -> HttpResponse {
    match load_from_mount(static_dir, ctx.path, mount_path, index_files).await {
        Some(file) => build_static_file_response(file, ctx.if_none_match.as_deref(), ctx.is_head),
        None => http::build_404_response(),
    }
}

/// Resolve `path` (a request path under `mount_path`) to a file in `static_dir`
pub async fn load_from_mount(
    static_dir: &Path,
    path: &str,
    mount_path: &str,
    index_files: &[String],
) -> Option<StaticFile> {
    let mount = mount_path.trim_end_matches('/');
    let rest = path.strip_prefix(mount)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    let rest = rest.trim_start_matches('/');

    let relative = Path::new(rest);
    // Only plain segments; `..`, roots and prefixes are rejected outright
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return None;
    }

    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    let mut relative = relative.to_path_buf();
    let wants_index = rest.is_empty() || rest.ends_with('/');
    let is_dir = fs::metadata(static_dir.join(&relative))
        .await
        .is_ok_and(|m| m.is_dir());
    if wants_index || is_dir {
        for index_file in index_files {
            let candidate = relative.join(index_file);
            if fs::metadata(static_dir.join(&candidate))
                .await
                .is_ok_and(|m| m.is_file())
            {
                relative = candidate;
                break;
            }
        }
    }

    let file_path = static_dir.join(&relative);

    // Symlinks must still resolve inside the static directory
    let file_path_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_debug(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    Some(StaticFile {
        content,
        content_type: mime::content_type_for(&file_path),
        relative,
    })
}

/// Load a single file with its content type
pub async fn load_single_file(file_path: &Path) -> Option<(Vec<u8>, &'static str)> {
    let content = fs::read(file_path).await.ok()?;
    Some((content, mime::content_type_for(file_path)))
}

/// Build static file response with `ETag` and per-file cache policy
fn build_static_file_response(
    file: StaticFile,
    if_none_match: Option<&str>,
    is_head: bool,
) -> HttpResponse {
    let etag = cache::generate_etag(&file.content);
    let policy = CachePolicy::for_static_file(&file.relative);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, policy);
    }

    http::build_file_response(
        Bytes::from(file.content),
        file.content_type,
        &etag,
        policy,
        is_head,
    )
}
