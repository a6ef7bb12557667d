//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, route matching, and access logging. Rendered pages win
//! over public assets, so a page route always shadows a file of the
//! same name.

use crate::config::{AppState, AssetsConfig};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::views::{self, Page};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_text(req.headers(), "referer");
    entry.user_agent = header_text(req.headers(), "user-agent");

    let mut response = dispatch(&req, &state).await;

    if let Ok(server) = hyper::header::HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert("server", server);
    }

    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if state.config.logging.access_log {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Validate the request, then route it
async fn dispatch(
    req: &Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return resp;
    }

    // 3. Extract headers for caching and range requests
    let ctx = RequestContext {
        path,
        is_head,
        if_none_match: header_text(req.headers(), "if-none-match"),
        range_header: header_text(req.headers(), "range"),
    };

    route_request(&ctx, &state.config.assets).await
}

/// Route request based on path
async fn route_request(ctx: &RequestContext<'_>, assets: &AssetsConfig) -> Response<Full<Bytes>> {
    // 1. Rendered pages (exact match)
    if let Some(page) = Page::from_path(ctx.path) {
        return http::response::build_page_response(views::render(page), ctx.is_head);
    }

    // 2. Legacy login page, served as the raw file instead of a view
    if ctx.path == "/login2" {
        let login_file = Path::new(&assets.public_dir).join("login.html");
        return static_files::serve_file(ctx, &login_file).await;
    }

    // 3. Public assets
    static_files::serve_asset(ctx, assets).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
            range_header: None,
        }
    }

    fn assets_in(dir: &std::path::Path) -> AssetsConfig {
        AssetsConfig {
            public_dir: dir.to_string_lossy().into_owned(),
            index_files: vec!["index.html".to_string()],
        }
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
    }

    #[tokio::test]
    async fn test_login_route_renders_titled_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/login"), &assets_in(dir.path())).await;

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
        let body = String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body");
        assert!(body.contains("로그인 페이지"));
    }

    #[tokio::test]
    async fn test_posts_route_renders_board_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/posts"), &assets_in(dir.path())).await;

        assert_eq!(response.status(), 200);
        let body = String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body");
        assert!(body.contains("게시판"));
    }

    #[tokio::test]
    async fn test_page_route_accepts_trailing_slash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/posts/"), &assets_in(dir.path())).await;

        assert_eq!(response.status(), 200);
        let body = String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body");
        assert!(body.contains("게시판"));
    }

    #[tokio::test]
    async fn test_signup_route_renders_titled_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/signup"), &assets_in(dir.path())).await;

        assert_eq!(response.status(), 200);
        let body = String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body");
        assert!(body.contains("회원가입 페이지"));
    }

    #[tokio::test]
    async fn test_login2_serves_raw_file_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = "<html><body>legacy login</body></html>";
        std::fs::write(dir.path().join("login.html"), raw).expect("write login.html");

        let response = route_request(&ctx("/login2"), &assets_in(dir.path())).await;

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_bytes(response).await, Bytes::from(raw));
    }

    #[tokio::test]
    async fn test_login2_without_file_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/login2"), &assets_in(dir.path())).await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = route_request(&ctx("/nonexistent"), &assets_in(dir.path())).await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_page_route_shadows_asset_of_same_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("posts"), "asset, not a page").expect("write asset");

        let response = route_request(&ctx("/posts"), &assets_in(dir.path())).await;
        let body = String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body");
        assert!(body.contains("게시판"));
        assert!(!body.contains("asset, not a page"));
    }

    #[test]
    fn test_get_and_head_pass_method_check() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());
    }

    #[test]
    fn test_options_gets_preflight_response() {
        let response = check_http_method(&Method::OPTIONS, false).expect("options response");
        assert_eq!(response.status(), 204);
    }

    #[test]
    fn test_post_is_method_not_allowed() {
        let response = check_http_method(&Method::POST, false).expect("405 response");
        assert_eq!(response.status(), 405);
        assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn test_body_size_within_limit_passes() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "512".parse().expect("header value"));
        assert!(check_body_size(&headers, 1024).is_none());
    }

    #[test]
    fn test_oversized_body_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "2048".parse().expect("header value"));
        let response = check_body_size(&headers, 1024).expect("413 response");
        assert_eq!(response.status(), 413);
    }

    #[test]
    fn test_unparsable_content_length_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "abc".parse().expect("header value"));
        assert!(check_body_size(&headers, 1024).is_none());
    }
}
