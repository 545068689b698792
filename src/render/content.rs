//! Content dispatch
//!
//! Picks how a resolved file becomes the page body: markdown conversion,
//! server template inclusion or raw passthrough.

use std::fs;
use std::io;
use std::path::Path;

use super::markdown::MarkdownRenderer;
use crate::config::SiteConfig;

/// How a content file is turned into HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Markdown,
    Template,
    Raw,
}

impl ContentKind {
    /// Classify a file by its extension
    pub fn of(path: &Path, site: &SiteConfig) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Raw;
        };

        if site.markdown_extensions.iter().any(|m| m == ext) {
            Self::Markdown
        } else if site.template_extensions.iter().any(|t| t == ext) {
            Self::Template
        } else {
            Self::Raw
        }
    }
}

/// Values a page exposes to templates and the page shell
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub file_path: &'a Path,
    pub root_url: &'a str,
    pub index_url: &'a str,
}

/// Inline text shown instead of a file that is not there
pub fn missing_file_message(path: &Path) -> String {
    format!("File '{}' doesn't exist!", path.display())
}

/// Render the body of a page
///
/// A file that vanished since routing degrades to the missing-file message.
/// Every other I/O failure is returned to the caller.
pub fn render_content(
    markdown: &MarkdownRenderer,
    site: &SiteConfig,
    ctx: &PageContext<'_>,
) -> io::Result<String> {
    let rendered = match ContentKind::of(ctx.file_path, site) {
        ContentKind::Markdown => fs::read_to_string(ctx.file_path).map(|s| markdown.render(&s)),
        ContentKind::Template => include_template(ctx.file_path, ctx),
        ContentKind::Raw => stream_raw(ctx.file_path),
    };
    recover_missing(rendered, ctx.file_path)
}

/// Render a markdown fragment such as the sidebar
pub fn render_fragment(markdown: &MarkdownRenderer, path: &Path) -> io::Result<String> {
    recover_missing(
        fs::read_to_string(path).map(|s| markdown.render(&s)),
        path,
    )
}

/// Server template with `{{ name }}` placeholders filled from the page
///
/// Known names: `page_title`, `file_path`, `root_url`, `index_url`.
/// Unknown placeholders are left untouched.
pub fn include_template(path: &Path, ctx: &PageContext<'_>) -> io::Result<String> {
    let source = fs::read_to_string(path)?;
    let file_path = ctx.file_path.display().to_string();
    let vars = [
        ("page_title", ctx.title),
        ("file_path", file_path.as_str()),
        ("root_url", ctx.root_url),
        ("index_url", ctx.index_url),
    ];
    Ok(substitute(&source, &vars))
}

/// File contents verbatim; invalid UTF-8 is replaced
pub fn stream_raw(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn recover_missing(result: io::Result<String>, path: &Path) -> io::Result<String> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(missing_file_message(path)),
        other => other,
    }
}

fn substitute(source: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };

        let name = after_open[..close].trim();
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}
