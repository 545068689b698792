// Application state module
// Everything a request needs, built once at startup and shared read-only

use std::fs;
use std::path::Path;

use super::types::Config;
use crate::logger;
use crate::render::{MarkdownRenderer, PageShell};
use crate::routing::Router;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,
    pub markdown: MarkdownRenderer,
    pub shell: PageShell,
}

impl AppState {
    /// Build the shared state from the loaded configuration
    pub fn new(config: &Config) -> Self {
        let analytics = config
            .shell
            .analytics_file
            .as_deref()
            .and_then(load_analytics);

        Self {
            config: config.clone(),
            router: Router::new(&config.site),
            markdown: MarkdownRenderer::new(),
            shell: PageShell::new(config.shell.clone(), analytics),
        }
    }
}

/// Read the analytics snippet; a missing file only disables it
fn load_analytics(path: &str) -> Option<String> {
    match fs::read_to_string(Path::new(path)) {
        Ok(snippet) => Some(snippet),
        Err(e) => {
            logger::log_warning(&format!("Analytics snippet '{path}' not loaded: {e}"));
            None
        }
    }
}
