//! HTTP response building module
//!
//! Builders for the responses the site sends, independent of routing.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CACHE_CONTROL, ETAG, SERVER};
use hyper::{Response, StatusCode};

use super::cache::CacheControl;

type Resp = Response<Full<Bytes>>;

/// Build a rendered page response
///
/// `status` is 200 for regular pages and 404 for the not-found page.
pub fn build_page_response(status: StatusCode, html: String, etag: &str, is_head: bool) -> Resp {
    let content_length = html.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(html)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, CacheControl::Revalidate.header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build static asset response
pub fn build_asset_response(data: Bytes, content_type: &str, etag: &str, is_head: bool) -> Resp {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, CacheControl::Public(3600).header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Stamp the configured `Server` header; an empty name sends none
pub fn set_server_header(resp: &mut Resp, server_name: &str) {
    if server_name.is_empty() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(server_name) {
        resp.headers_mut().insert(SERVER, value);
    }
}

/// Build 302 redirect response
pub fn build_redirect_response(location: &str) -> Resp {
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", location)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(Full::new(Bytes::from("Redirecting...")))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Resp {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build plain 404 for missing static assets
pub fn build_404_response() -> Resp {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Resp {
    let mut resp = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD, OPTIONS"));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Resp {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 500 response; never exposes the underlying error
pub fn build_500_response() -> Resp {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Resp {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn plain_text(status: StatusCode, text: &'static str) -> Resp {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(text)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
