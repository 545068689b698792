//! Redirect table for moved or renamed content

use std::collections::HashMap;

use crate::config::RedirectEntry;

/// Exact-match mapping from retired logical paths to their replacements
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: HashMap<String, String>,
}

impl RedirectTable {
    pub fn new(entries: &[RedirectEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|e| (e.from.clone(), e.to.clone()))
                .collect(),
        }
    }

    /// Replacement for `logical_path`, compared byte for byte
    pub fn lookup(&self, logical_path: &str) -> Option<&str> {
        self.entries.get(logical_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
