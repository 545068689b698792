//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, asset
//! lookup, rewrite emulation, content routing and page assembly.

use crate::config::{AppState, SiteConfig};
use crate::handler::static_files;
use crate::http::{self, cache, response};
use crate::logger::{self, AccessLogEntry};
use crate::render::{render_content, render_fragment, PageContext};
use crate::routing::{Decision, RedirectReason, RequestParts, ResolvedTarget, TargetStatus};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HOST, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Where a request path points inside the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRequest {
    /// Static asset, path relative to the asset directory
    Asset(String),
    /// Content page; `uri` and `query` as a rewriting web server would pass them
    Content { uri: String, query: String },
    /// Outside the site's base path
    Outside,
}

/// Outcome of the blocking part of a content request
enum PageOutcome {
    Redirect {
        location: String,
    },
    Page {
        status: StatusCode,
        html: String,
    },
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // Pages are read-only; only the head of the request matters
    let (head, _) = req.into_parts();
    let req = Request::from_parts(head, ());
    let (mut resp, target) = dispatch(&req, &state).await;
    response::set_server_header(&mut resp, &state.config.http.server_name);

    if state.config.logging.access_log {
        let format = &state.config.logging.access_log_format;
        log_access(&req, &resp, target, peer_addr, started, format);
    }

    Ok(resp)
}

async fn dispatch(
    req: &Request<()>,
    state: &Arc<AppState>,
) -> (Response<Full<Bytes>>, Option<String>) {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return (resp, None);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return (resp, None);
    }

    let is_head = req.method() == Method::HEAD;
    let if_none_match = header_str(req, IF_NONE_MATCH.as_str());

    // 3. Assets, content, or nothing
    let site_request = classify(
        req.uri().path(),
        req.uri().query(),
        &state.config.site,
        &state.config.assets.url_prefix,
    );

    match site_request {
        SiteRequest::Asset(relative) => {
            let resp = static_files::serve_asset(
                &state.config.assets.dir,
                &relative,
                if_none_match,
                is_head,
            )
            .await;
            (resp, Some(relative))
        }
        SiteRequest::Content { uri, query } => {
            let host = request_host(req, state);
            serve_content(state, host, uri, query, if_none_match, is_head).await
        }
        SiteRequest::Outside => (http::build_404_response(), None),
    }
}

/// Host used to build site URLs
///
/// A configured `site.public_host` wins over the client's `Host` header, so
/// redirects cannot be pointed at another site.
fn request_host(req: &Request<()>, state: &AppState) -> String {
    if let Some(public_host) = &state.config.site.public_host {
        return public_host.clone();
    }
    header_str(req, HOST.as_str()).map_or_else(
        || format!("{}:{}", state.config.server.host, state.config.server.port),
        ToString::to_string,
    )
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(req: &Request<()>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = header_str(req, "content-length")?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
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
    }
}

/// Map a request path onto the site
///
/// Below the base path, `index.php` or the bare base path carry the logical
/// path in the query string, passed on undecoded. Any other path is
/// rewritten the way a web server rewrite rule would: the percent-decoded
/// path becomes the query string.
pub fn classify(
    path: &str,
    query: Option<&str>,
    site: &SiteConfig,
    asset_prefix: &str,
) -> SiteRequest {
    let base = format!("/{}", site.base_path.trim_matches('/'));
    let relative = if base == "/" {
        Some(path.trim_start_matches('/'))
    } else if path == base {
        Some("")
    } else {
        path.strip_prefix(base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    };

    let Some(relative) = relative else {
        return SiteRequest::Outside;
    };

    let asset_prefix = asset_prefix.trim_matches('/');
    if !asset_prefix.is_empty() {
        if let Some(asset) = relative
            .strip_prefix(asset_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return SiteRequest::Asset(asset.to_string());
        }
    }

    if relative.is_empty() || relative == "index.php" {
        let query = query.unwrap_or_default().to_string();
        return SiteRequest::Content {
            uri: format!("{path}?{query}"),
            query,
        };
    }

    // `relative` is a suffix of `path`; keep the prefix and decode the rest
    let prefix = &path[..path.len() - relative.len()];
    let decoded = percent_decode_str(relative).decode_utf8_lossy();
    SiteRequest::Content {
        uri: format!("{prefix}{decoded}"),
        query: decoded.into_owned(),
    }
}

async fn serve_content(
    state: &Arc<AppState>,
    host: String,
    uri: String,
    query: String,
    if_none_match: Option<&str>,
    is_head: bool,
) -> (Response<Full<Bytes>>, Option<String>) {
    let blocking_state = Arc::clone(state);
    let outcome = tokio::task::spawn_blocking(move || {
        build_outcome(
            &blocking_state,
            RequestParts {
                host: &host,
                uri: &uri,
                query: &query,
            },
        )
    })
    .await;

    match outcome {
        Ok(Ok((PageOutcome::Redirect { location }, _))) => {
            let resp = http::build_redirect_response(&location);
            (resp, Some(location))
        }
        Ok(Ok((PageOutcome::Page { status, html }, target))) => {
            let etag = cache::generate_etag(html.as_bytes());
            if status == StatusCode::OK && cache::check_etag_match(if_none_match, &etag) {
                return (http::build_304_response(&etag), target);
            }
            (
                response::build_page_response(status, html, &etag, is_head),
                target,
            )
        }
        Ok(Err(_)) => (http::build_500_response(), None),
        Err(e) => {
            logger::log_error(&format!("Page task failed: {e}"));
            (http::build_500_response(), None)
        }
    }
}

/// Route and render one content request
///
/// Returns the outcome and the file it ended on, for the access log.
fn build_outcome(
    state: &AppState,
    parts: RequestParts<'_>,
) -> io::Result<(PageOutcome, Option<String>)> {
    let decision = state.router.route(parts).inspect_err(|e| {
        logger::log_error(&format!("Failed to route '{}': {e}", parts.query));
    })?;

    match decision {
        Decision::Redirect { location, reason } => {
            let reason = match reason {
                RedirectReason::DefaultPath => "default page",
                RedirectReason::Moved => "moved",
            };
            logger::log_redirect(parts.query, &location, reason);
            Ok((PageOutcome::Redirect { location }, None))
        }
        Decision::Render(target) => {
            let status = match target.status {
                TargetStatus::Found => StatusCode::OK,
                TargetStatus::NotFound => {
                    logger::log_not_found(&target.logical_path, &target.file_path);
                    if state.config.site.not_found_status {
                        StatusCode::NOT_FOUND
                    } else {
                        StatusCode::OK
                    }
                }
            };
            let html = render_page(state, &target)
                .inspect_err(|e| logger::log_render_failed(&target.file_path, e))?;
            let file = target.file_path.display().to_string();
            Ok((PageOutcome::Page { status, html }, Some(file)))
        }
    }
}

/// Sidebar, page body and shell for a resolved target
pub fn render_page(state: &AppState, target: &ResolvedTarget) -> io::Result<String> {
    let ctx = PageContext {
        title: &target.title,
        file_path: &target.file_path,
        root_url: &target.root_url,
        index_url: &target.index_url,
    };

    let sidebar_path = state.router.content_root().join(&state.config.site.sidebar_file);
    let sidebar = render_fragment(&state.markdown, &sidebar_path)?;
    let content = render_content(&state.markdown, &state.config.site, &ctx)?;

    Ok(state.shell.render(&ctx, &sidebar, &content))
}

fn header_str<'a>(req: &'a Request<()>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Request<()>,
    response: &Response<Full<Bytes>>,
    target: Option<String>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    entry.referer = header_str(req, REFERER.as_str()).map(ToString::to_string);
    entry.user_agent = header_str(req, USER_AGENT.as_str()).map(ToString::to_string);
    entry.target = target;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RedirectEntry};
    use http_body_util::BodyExt;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        state: Arc<AppState>,
    }

    fn site(configure: impl FnOnce(&mut Config)) -> Site {
        let dir = TempDir::new().unwrap();
        let files = dir.path().join("files");
        let assets = dir.path().join("assets");
        fs::create_dir_all(files.join("guides")).unwrap();
        fs::create_dir_all(&assets).unwrap();
        fs::write(files.join("welcome.md"), "# Welcome\n").unwrap();
        fs::write(files.join("guides/first-steps.md"), "Step *one*\n").unwrap();
        fs::write(files.join("404.md"), "Nothing here\n").unwrap();
        fs::write(files.join("sidebar.md"), "- [Home](welcome)\n").unwrap();
        fs::write(assets.join("site.css"), "body{}").unwrap();

        let mut config = Config::load_from("/nonexistent/docsite-config").unwrap();
        config.logging.access_log = false;
        config.site.content_root = files.to_str().unwrap().to_string();
        config.site.redirects = vec![RedirectEntry {
            from: "old".to_string(),
            to: "guides/first-steps".to_string(),
        }];
        config.assets.dir = assets.to_str().unwrap().to_string();
        configure(&mut config);

        Site {
            state: Arc::new(AppState::new(&config)),
            _dir: dir,
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .uri(uri)
            .header("Host", "docs.example.com")
            .body(())
            .unwrap();
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_classify() {
        let site = SiteConfig::default();
        assert_eq!(
            classify("/guides/intro", None, &site, "assets/"),
            SiteRequest::Content {
                uri: "/guides/intro".to_string(),
                query: "guides/intro".to_string(),
            }
        );
        assert_eq!(
            classify("/index.php", Some("intro"), &site, "assets/"),
            SiteRequest::Content {
                uri: "/index.php?intro".to_string(),
                query: "intro".to_string(),
            }
        );
        assert_eq!(
            classify("/assets/css/site.css", None, &site, "assets/"),
            SiteRequest::Asset("css/site.css".to_string())
        );
        // a page that merely starts with the prefix text is still content
        assert!(matches!(
            classify("/assetsful", None, &site, "assets/"),
            SiteRequest::Content { .. }
        ));
    }

    #[test]
    fn test_classify_with_base_path() {
        let site = SiteConfig {
            base_path: "/docs/".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(
            classify("/docs", None, &site, "assets/"),
            SiteRequest::Content {
                uri: "/docs?".to_string(),
                query: String::new(),
            }
        );
        assert_eq!(
            classify("/docs/intro", None, &site, "assets/"),
            SiteRequest::Content {
                uri: "/docs/intro".to_string(),
                query: "intro".to_string(),
            }
        );
        assert_eq!(classify("/other", None, &site, "assets/"), SiteRequest::Outside);
        assert_eq!(classify("/docsx/intro", None, &site, "assets/"), SiteRequest::Outside);
    }

    #[tokio::test]
    async fn test_root_redirects_to_default_page() {
        let s = site(|_| {});
        let resp = get(&s.state, "/").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "http://docs.example.com/welcome");
    }

    #[tokio::test]
    async fn test_query_form_without_rewrite() {
        let s = site(|c| c.site.use_rewrite = false);
        let resp = get(&s.state, "/index.php").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()["Location"],
            "http://docs.example.com/index.php?welcome"
        );

        let resp = get(&s.state, "/index.php?guides/first-steps").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<em>one</em>"));
        assert!(html.contains("<a href=\"http://docs.example.com/index.php?\">"));
    }

    #[tokio::test]
    async fn test_renders_page_in_shell() {
        let s = site(|_| {});
        let resp = get(&s.state, "/guides/first-steps").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        let html = body_text(resp).await;
        assert!(html.contains("<title>First Steps - Documentation</title>"));
        assert!(html.contains("Step <em>one</em>"));
        assert!(html.contains("<a href=\"welcome\">Home</a>"));
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let s = site(|_| {});
        let resp = get(&s.state, "/welcome").await;
        let etag = resp.headers()["ETag"].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/welcome")
            .header("Host", "docs.example.com")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&s.state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_redirect_table() {
        let s = site(|_| {});
        let resp = get(&s.state, "/old").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()["Location"],
            "http://docs.example.com/guides/first-steps"
        );
    }

    #[tokio::test]
    async fn test_missing_page_status() {
        let s = site(|_| {});
        let resp = get(&s.state, "/ghost").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let html = body_text(resp).await;
        assert!(html.contains("<title>404 - Documentation</title>"));
        assert!(html.contains("Nothing here"));

        let s = site(|c| c.site.not_found_status = false);
        let resp = get(&s.state, "/ghost").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Nothing here"));
    }

    #[tokio::test]
    async fn test_missing_not_found_page_still_renders() {
        let s = site(|_| {});
        fs::remove_file(s.state.router.content_root().join("404.md")).unwrap();
        let resp = get(&s.state, "/ghost").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(resp).await.contains("404.md' doesn't exist!"));
    }

    #[tokio::test]
    async fn test_assets_and_methods() {
        let s = site(|_| {});
        let resp = get(&s.state, "/assets/site.css").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/css; charset=utf-8");

        let req = Request::builder()
            .method(Method::POST)
            .uri("/welcome")
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&s.state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_head_has_empty_body() {
        let s = site(|_| {});
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/welcome")
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&s.state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_directories_are_not_pages() {
        let s = site(|_| {});
        let files = s.state.router.content_root().to_path_buf();
        fs::create_dir_all(files.join("v1.5")).unwrap();
        fs::write(files.join("v1.5/intro.md"), "Versioned\n").unwrap();
        fs::create_dir_all(Path::new(&s.state.config.assets.dir).join("css")).unwrap();

        for uri in ["/?.", "/v1.5", "/index.php?v1.5"] {
            let resp = get(&s.state, uri).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(body_text(resp).await.contains("Nothing here"), "{uri}");
        }

        let resp = get(&s.state, "/v1.5/intro").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get(&s.state, "/assets/css").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_failure_answers_500() {
        let s = site(|_| {});
        let files = s.state.router.content_root().to_path_buf();
        fs::write(files.join("broken.md"), [0xff, 0xfe, b'#']).unwrap();

        let resp = get(&s.state, "/broken").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(resp).await, "500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_unreadable_sidebar_answers_500() {
        let s = site(|_| {});
        let files = s.state.router.content_root().to_path_buf();
        fs::remove_file(files.join("sidebar.md")).unwrap();
        fs::create_dir_all(files.join("sidebar.md")).unwrap();

        let resp = get(&s.state, "/welcome").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_header() {
        let s = site(|_| {});
        let resp = get(&s.state, "/welcome").await;
        assert_eq!(resp.headers()["Server"], "docsite/0.1");
        let resp = get(&s.state, "/assets/site.css").await;
        assert_eq!(resp.headers()["Server"], "docsite/0.1");

        let s = site(|c| c.http.server_name = String::new());
        let resp = get(&s.state, "/welcome").await;
        assert!(resp.headers().get("Server").is_none());
    }

    #[tokio::test]
    async fn test_public_host_overrides_host_header() {
        let s = site(|c| c.site.public_host = Some("docs.example.org".to_string()));
        let resp = get(&s.state, "/").await;
        assert_eq!(resp.headers()["Location"], "http://docs.example.org/welcome");

        let resp = get(&s.state, "/old").await;
        assert_eq!(
            resp.headers()["Location"],
            "http://docs.example.org/guides/first-steps"
        );
    }

    #[tokio::test]
    async fn test_rewrite_path_is_percent_decoded() {
        let s = site(|_| {});
        let files = s.state.router.content_root().to_path_buf();
        fs::write(files.join("getting started.md"), "Spaced\n").unwrap();

        let resp = get(&s.state, "/getting%20started").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp)
            .await
            .contains("<title>Getting Started - Documentation</title>"));

        let resp = get(&s.state, "/%2e%2e/secret").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_classify_decodes_rewrite_form_only() {
        let site = SiteConfig {
            base_path: "/docs".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(
            classify("/docs/a%20b", None, &site, "assets/"),
            SiteRequest::Content {
                uri: "/docs/a b".to_string(),
                query: "a b".to_string(),
            }
        );
        assert_eq!(
            classify("/docs/index.php", Some("a%20b"), &site, "assets/"),
            SiteRequest::Content {
                uri: "/docs/index.php?a%20b".to_string(),
                query: "a%20b".to_string(),
            }
        );
    }
}
