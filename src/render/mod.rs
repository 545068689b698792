//! Page rendering
//!
//! Markdown conversion (comrak), content dispatch by file type and the
//! page shell (maud) that wraps the sidebar and the page body.

mod content;
mod markdown;
mod shell;

pub use content::{render_content, render_fragment, PageContext};
pub use markdown::MarkdownRenderer;
pub use shell::PageShell;
