//! Markdown rendering with GitHub Flavored Markdown support.

use comrak::Options;

/// Renders markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Output depends only on the input text, so the same source always
/// produces byte-identical HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub const fn new() -> Self {
        Self
    }

    /// GitHub Flavored Markdown options.
    ///
    /// Content files are authored by the site owner, so raw HTML inside
    /// markdown is passed through.
    fn options() -> Options<'static> {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());

        options.render.unsafe_ = true;

        options
    }

    /// Renders markdown content to HTML string.
    #[allow(clippy::unused_self)]
    pub fn render(&self, source: &str) -> String {
        comrak::markdown_to_html(source, &Self::options())
    }
}
