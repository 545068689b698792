//! Static asset serving module
//!
//! Serves stylesheets, scripts and images referenced by the page shell,
//! with MIME detection and `ETag` revalidation.

use crate::http::{self, cache, mime, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve an asset below `asset_dir`
///
/// `relative_path` is the request path with the asset prefix removed.
pub async fn serve_asset(
    asset_dir: &str,
    relative_path: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let Some(file_path) = locate_asset(Path::new(asset_dir), relative_path) else {
        return http::build_404_response();
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read asset '{}': {e}",
                file_path.display()
            ));
            return http::build_500_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    response::build_asset_response(Bytes::from(content), content_type, &etag, is_head)
}

/// Resolve an asset path, refusing anything outside `asset_dir`
pub fn locate_asset(asset_dir: &Path, relative_path: &str) -> Option<PathBuf> {
    let relative_path = relative_path.trim_start_matches('/');
    if relative_path.is_empty() {
        return None;
    }

    let asset_dir_canonical = match asset_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Asset directory not found or inaccessible '{}': {e}",
                asset_dir.display()
            ));
            return None;
        }
    };

    // Missing assets are common (404), no need to log them
    let file_path_canonical = asset_dir.join(relative_path).canonicalize().ok()?;
    if !file_path_canonical.starts_with(&asset_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative_path} -> {}",
            file_path_canonical.display()
        ));
        return None;
    }

    file_path_canonical.is_file().then_some(file_path_canonical)
}
