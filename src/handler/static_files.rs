//! Static file serving module
//!
//! Serves the asset root for any path no fixed route claims, with MIME
//! detection, `ETag` validation, and a long-lived cache header. Misses are
//! 404s, never errors.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;

/// Serve a static asset for the request path, or 404.
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let assets = &state.config.assets;
    match load(&assets.dir, ctx.path).await {
        Some((content, content_type)) => {
            let etag = cache::generate_etag(&content);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag, assets.max_age_secs());
            }
            http::build_asset_response(
                content,
                content_type,
                &etag,
                assets.max_age_secs(),
                ctx.is_head,
            )
        }
        None => http::build_404_response(),
    }
}

/// Load a file under the asset root, refusing anything that escapes it.
async fn load(asset_root: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and collapse traversal sequences
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let mut file_path = Path::new(asset_root).join(&clean_path);

    let root_canonical = match Path::new(asset_root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Asset directory not found or inaccessible '{asset_root}': {e}"
            ));
            return None;
        }
    };

    // Directory paths fall through to their index file
    if file_path.is_dir() {
        file_path = file_path.join("index.html");
    }

    // File not found is an ordinary 404, not worth logging
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path_canonical.display(),
                e
            ));
            return None;
        }
    };

    let content_type =
        mime::get_content_type(file_path_canonical.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vitals-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("css")).unwrap();
        std::fs::write(dir.join("css/site.css"), "body{}").unwrap();
        std::fs::write(dir.join("index.html"), "<html>index</html>").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let dir = asset_dir();
        let (content, content_type) = load(dir.to_str().unwrap(), "/css/site.css")
            .await
            .unwrap();
        assert_eq!(content, b"body{}");
        assert_eq!(content_type, "text/css");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = asset_dir();
        assert!(load(dir.to_str().unwrap(), "/nope.txt").await.is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_directory_serves_index_file() {
        let dir = asset_dir();
        let (content, content_type) = load(dir.to_str().unwrap(), "/").await.unwrap();
        assert_eq!(content, b"<html>index</html>");
        assert_eq!(content_type, "text/html; charset=utf-8");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let dir = asset_dir();
        // ".." collapses away, so this resolves inside the root or misses
        assert!(load(dir.to_str().unwrap(), "/../../etc/passwd")
            .await
            .is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_asset_root_is_none() {
        assert!(load("no-such-asset-root", "/x.txt").await.is_none());
    }
}
