// Configuration module entry point
// Loads the layered configuration once at startup and holds the shared state

mod state;
mod types;

use hyper::header::HeaderValue;
use std::collections::HashSet;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, RedirectEntry, ShellConfig, SiteConfig};

/// Configuration file looked up when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Any format the `config` crate understands works (`config.toml`,
    /// `config.json`, ...). The file is optional; built-in defaults apply
    /// for every missing key. `DOCSITE__SITE__DEFAULT_PATH=intro` style
    /// environment variables override both.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("DOCSITE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "docsite/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("site.content_root", "files")?
            .set_default("site.default_path", "welcome")?
            .set_default("site.use_rewrite", true)?
            .set_default("site.candidate_extensions", vec!["md", "html", "php"])?
            .set_default("site.not_found_file", "404.md")?
            .set_default("site.sidebar_file", "sidebar.md")?
            .set_default("site.not_found_status", true)?
            .set_default("site.base_path", "/")?
            .set_default("site.markdown_extensions", vec!["md"])?
            .set_default("site.template_extensions", vec!["php"])?
            .set_default("shell.site_name", "Documentation")?
            .set_default("assets.dir", "assets")?
            .set_default("assets.url_prefix", "assets/")?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Reject settings the router cannot work with
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.site.default_path.trim_matches('/').is_empty() {
            return Err(config::ConfigError::Message(
                "site.default_path must name a page".to_string(),
            ));
        }

        if HeaderValue::from_str(&self.http.server_name).is_err() {
            return Err(config::ConfigError::Message(format!(
                "http.server_name '{}' is not a valid header value",
                self.http.server_name
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.site.redirects {
            if !seen.insert(entry.from.as_str()) {
                return Err(config::ConfigError::Message(format!(
                    "duplicate redirect source '{}'",
                    entry.from
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load(contents: &str) -> Result<Config, config::ConfigError> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.toml");
        fs::write(&path, contents).unwrap();
        Config::load_from(path.to_str().unwrap())
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/docsite-config").unwrap();
        assert_eq!(cfg.site.content_root, "files");
        assert_eq!(cfg.site.default_path, "welcome");
        assert!(cfg.site.use_rewrite);
        assert_eq!(cfg.site.candidate_extensions, vec!["md", "html", "php"]);
        assert!(cfg.site.redirects.is_empty());
        assert_eq!(cfg.assets.url_prefix, "assets/");
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_file_overrides() {
        let cfg = load(
            r#"
[site]
content_root = "docs"
default_path = "intro"
use_rewrite = false
candidate_extensions = ["html", "md"]

[[site.redirects]]
from = "old-page"
to = "new-page"
"#,
        )
        .unwrap();

        assert_eq!(cfg.site.content_root, "docs");
        assert_eq!(cfg.site.default_path, "intro");
        assert!(!cfg.site.use_rewrite);
        assert_eq!(cfg.site.candidate_extensions, vec!["html", "md"]);
        assert_eq!(
            cfg.site.redirects,
            vec![RedirectEntry {
                from: "old-page".to_string(),
                to: "new-page".to_string(),
            }]
        );
        // untouched keys keep their defaults
        assert_eq!(cfg.site.sidebar_file, "sidebar.md");
    }

    #[test]
    fn test_duplicate_redirect_rejected() {
        let result = load(
            r#"
[[site.redirects]]
from = "a"
to = "b"

[[site.redirects]]
from = "a"
to = "c"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_server_name_rejected() {
        let result = load("[http]\nserver_name = \"docsite\\n0.1\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_public_host() {
        let cfg = load("[site]\npublic_host = \"docs.example.com\"\n").unwrap();
        assert_eq!(cfg.site.public_host.as_deref(), Some("docs.example.com"));
        assert_eq!(Config::load_from("/nonexistent/docsite-config").unwrap().site.public_host, None);
    }

    #[test]
    fn test_empty_default_path_rejected() {
        let result = load("[site]\ndefault_path = \"/\"\n");
        assert!(result.is_err());
    }
}
