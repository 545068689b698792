//! Logger module
//!
//! Provides logging utilities for the site server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Routing events (redirects, missing pages)
//! - Error and warning logging with a level filter
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::routing::RedirectTable;
use std::net::SocketAddr;
use std::path::Path;

/// Log severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Parse a configured level name, defaulting to `Info`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn write(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level <= Level::Warn => eprintln!("{message}"),
        None => println!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, redirects: &RedirectTable) {
    let site = &config.site;
    write(Level::Info, "======================================");
    write(Level::Info, "Documentation server started");
    write(Level::Info, &format!("Listening on: http://{addr}"));
    write(Level::Info, &format!("Content root: {}", site.content_root));
    write(Level::Info, &format!("Default page: {}", site.default_path));
    write(
        Level::Info,
        &format!("Candidate extensions: {}", site.candidate_extensions.join(", ")),
    );
    if redirects.is_empty() {
        write(Level::Info, "Redirects: none");
    } else {
        write(Level::Info, &format!("Redirects: {}", redirects.len()));
    }
    write(
        Level::Info,
        &format!("URL rewriting: {}", if site.use_rewrite { "on" } else { "off" }),
    );
    write(Level::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(Level::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write(Level::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(Level::Info, &format!("Error log: {path}"));
    }
    write(Level::Info, "======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write(Level::Info, &format!("[INFO] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_redirect(logical_path: &str, location: &str, reason: &str) {
    write(
        Level::Debug,
        &format!("[Redirect] '{logical_path}' -> {location} ({reason})"),
    );
}

pub fn log_not_found(logical_path: &str, fallback: &Path) {
    write(
        Level::Info,
        &format!(
            "[NotFound] '{logical_path}' has no file or redirect, serving {}",
            fallback.display()
        ),
    );
}

pub fn log_render_failed(path: &Path, err: &std::io::Error) {
    log_error(&format!("Failed to render '{}': {err}", path.display()));
}

pub fn log_shutdown(reason: &str) {
    write(Level::Info, &format!("[Shutdown] {reason}, no longer accepting connections"));
}
