// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub site: SiteConfig,
    pub shell: ShellConfig,
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Sent as the `Server` response header; empty to omit it
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Content site configuration: where pages live and how logical paths resolve
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Directory holding the renderable content
    pub content_root: String,
    /// Logical path served when the request names none
    pub default_path: String,
    /// Whether links and redirects use clean paths instead of `index.php?`
    pub use_rewrite: bool,
    /// Probed in order when a logical path has no extension
    pub candidate_extensions: Vec<String>,
    /// Retired logical paths and their replacements
    #[serde(default)]
    pub redirects: Vec<RedirectEntry>,
    /// Page rendered when nothing matches, relative to `content_root`
    pub not_found_file: String,
    /// Navigation fragment rendered next to every page, relative to `content_root`
    pub sidebar_file: String,
    /// Answer missing pages with status 404 (otherwise 200 with the 404 page)
    pub not_found_status: bool,
    /// URL prefix the site is mounted under
    pub base_path: String,
    /// Host (and port) for generated URLs; the request's `Host` header when unset
    #[serde(default)]
    pub public_host: Option<String>,
    pub markdown_extensions: Vec<String>,
    pub template_extensions: Vec<String>,
}

/// One row of the redirect table
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RedirectEntry {
    pub from: String,
    pub to: String,
}

/// Page shell chrome
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShellConfig {
    pub site_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    /// Stylesheet paths relative to the root URL
    #[serde(default)]
    pub stylesheets: Vec<String>,
    /// Script paths relative to the root URL (absolute URLs kept as-is)
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub footer_html: Option<String>,
    /// HTML snippet appended to pages not served from localhost
    #[serde(default)]
    pub analytics_file: Option<String>,
}

/// Static asset mount
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    /// Directory the assets are read from
    pub dir: String,
    /// URL prefix below `site.base_path`, e.g. `assets/`
    pub url_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "files".to_string(),
            default_path: "welcome".to_string(),
            use_rewrite: true,
            candidate_extensions: vec!["md".to_string(), "html".to_string(), "php".to_string()],
            redirects: Vec::new(),
            not_found_file: "404.md".to_string(),
            sidebar_file: "sidebar.md".to_string(),
            not_found_status: true,
            base_path: "/".to_string(),
            public_host: None,
            markdown_extensions: vec!["md".to_string()],
            template_extensions: vec!["php".to_string()],
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            site_name: "Documentation".to_string(),
            description: None,
            keywords: None,
            stylesheets: Vec::new(),
            scripts: Vec::new(),
            footer_html: None,
            analytics_file: None,
        }
    }
}
