//! MIME type detection module
//!
//! Content-Type of static assets by file extension.

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };

    match ext.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "xml" => "application/xml",

        // Scripts and data
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "lua" => "text/x-lua; charset=utf-8",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Downloads
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",

        _ => "application/octet-stream",
    }
}
