//! Public asset serving module
//!
//! Serves files rooted at the configured `public` directory with
//! conditional (`ETag`) and Range request support. Resolution never
//! escapes the public root.

use crate::config::AssetsConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, range::RangeParse};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a request path from the public assets directory
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    assets: &AssetsConfig,
) -> Response<Full<Bytes>> {
    match load_asset(ctx.path, assets).await {
        Some((content, content_type)) => build_asset_file_response(&content, content_type, ctx),
        None => http::build_404_response(),
    }
}

/// Serve one specific file, bypassing public directory resolution
pub async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<Full<Bytes>> {
    match load_file(file_path).await {
        Some((content, content_type)) => build_asset_file_response(&content, content_type, ctx),
        None => http::build_404_response(),
    }
}

/// Resolve a request path inside the public directory and read it
async fn load_asset(path: &str, assets: &AssetsConfig) -> Option<(Vec<u8>, &'static str)> {
    let public_dir = Path::new(&assets.public_dir);

    let public_canonical = match public_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Public directory not found or inaccessible '{}': {e}",
                assets.public_dir
            ));
            return None;
        }
    };

    let relative = path.trim_start_matches('/');
    let mut file_path = public_dir.join(relative);

    // Directory requests fall back to index files
    if file_path.is_dir() || relative.is_empty() || relative.ends_with('/') {
        file_path = resolve_index(&file_path, &assets.index_files)?;
    }

    // File not found is common (404), no need to log at warning level
    let Ok(file_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_canonical.starts_with(&public_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    read_with_content_type(&file_canonical).await
}

/// Load a single file without public root checks
async fn load_file(file_path: &Path) -> Option<(Vec<u8>, &'static str)> {
    if !file_path.is_file() {
        return None;
    }
    read_with_content_type(file_path).await
}

fn resolve_index(dir_path: &Path, index_files: &[String]) -> Option<PathBuf> {
    index_files
        .iter()
        .map(|index| dir_path.join(index))
        .find(|candidate| candidate.is_file())
}

async fn read_with_content_type(file_path: &Path) -> Option<(Vec<u8>, &'static str)> {
    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read asset '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build an asset response with `ETag` and Range support
fn build_asset_file_response(
    data: &[u8],
    content_type: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = cache::asset_etag(data);
    let total_size = data.len();

    // Client revalidation
    if cache::if_none_match_hits(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range(ctx.range_header.as_deref(), total_size) {
        RangeParse::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);

            let body = if ctx.is_head {
                Bytes::new()
            } else {
                Bytes::from(data[start..=end].to_vec())
            };

            http::response::build_partial_response(
                body,
                content_type,
                &etag,
                start,
                end,
                total_size,
                ctx.is_head,
            )
        }
        RangeParse::NotSatisfiable => http::build_416_response(total_size),
        RangeParse::None => http::response::build_asset_response(
            Bytes::from(data.to_vec()),
            content_type,
            &etag,
            ctx.is_head,
        ),
    }
}
