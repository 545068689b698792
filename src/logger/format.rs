//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` substitution

use chrono::{DateTime, Local};
use serde_json::json;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: DateTime<Local>,
    /// HTTP method (GET, HEAD, ...)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Content file or redirect location the request ended on
    pub target: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            target: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// Request URI with query string
    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "target": self.target,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`
    /// (seconds, 3 decimals), `$status`, `$body_bytes_sent`, `$http_referer`,
    /// `$http_user_agent`, `$target`.
    fn format_custom(&self, pattern: &str) -> String {
        let request_uri = self.request_uri();
        let request_line = format!("{} {} HTTP/{}", self.method, request_uri, self.http_version);
        #[allow(clippy::cast_precision_loss)]
        let request_time = format!("{:.3}", self.request_time_us as f64 / 1_000_000.0);

        // Longer names first so `$request` does not eat `$request_time`
        let vars = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", request_time),
            ("$request_method", self.method.clone()),
            ("$request_uri", request_uri),
            ("$request", request_line),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", self.referer.clone().unwrap_or_else(|| "-".to_string())),
            ("$http_user_agent", self.user_agent.clone().unwrap_or_else(|| "-".to_string())),
            ("$target", self.target.clone().unwrap_or_else(|| "-".to_string())),
        ];

        vars.iter()
            .fold(pattern.to_string(), |acc, (name, value)| acc.replace(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1".to_string(),
            "GET".to_string(),
            "/index.php".to_string(),
        );
        entry.query = Some("getting-started".to_string());
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.referer = Some("https://example.com".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.target = Some("files/getting-started.md".to_string());
        entry.request_time_us = 1_250_000;
        entry
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /index.php?getting-started HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"https://example.com\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.contains("GET /index.php?getting-started HTTP/1.1"));
        assert!(log.ends_with("200 1234"));
        assert!(!log.contains("https://example.com"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["query"], "getting-started");
        assert_eq!(value["status"], 200);
        assert_eq!(value["target"], "files/getting-started.md");
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry().format("$remote_addr $status $request_time $target $request");
        assert_eq!(
            log,
            "192.168.1.1 200 1.250 files/getting-started.md GET /index.php?getting-started HTTP/1.1"
        );
    }
}
