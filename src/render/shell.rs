//! Page shell wrapped around every rendered page

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::content::PageContext;
use crate::config::ShellConfig;

/// Complete HTML document around a page body and the sidebar
pub struct PageShell {
    config: ShellConfig,
    analytics: Option<String>,
}

impl PageShell {
    /// `analytics` is the snippet appended to pages served from a public host
    pub const fn new(config: ShellConfig, analytics: Option<String>) -> Self {
        Self { config, analytics }
    }

    pub fn render(&self, ctx: &PageContext<'_>, sidebar_html: &str, content_html: &str) -> String {
        self.markup(ctx, sidebar_html, content_html).into_string()
    }

    fn markup(&self, ctx: &PageContext<'_>, sidebar_html: &str, content_html: &str) -> Markup {
        let analytics = self
            .analytics
            .as_deref()
            .filter(|_| !is_local(ctx.root_url));

        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    @if let Some(description) = &self.config.description {
                        meta name="description" content=(description);
                    }
                    @if let Some(keywords) = &self.config.keywords {
                        meta name="keywords" content=(keywords);
                    }
                    title { (ctx.title) " - " (self.config.site_name) }
                    @for stylesheet in &self.config.stylesheets {
                        link rel="stylesheet" type="text/css" href=(asset_url(ctx.root_url, stylesheet));
                    }
                }
                body {
                    div class="wrapper" {
                        header {
                            h1 { a href=(ctx.index_url) { (self.config.site_name) } }
                        }
                        div role="main" class="main" {
                            aside class="sidebar" { (PreEscaped(sidebar_html)) }
                            div class="content" { (PreEscaped(content_html)) }
                        }
                        @if let Some(footer_html) = &self.config.footer_html {
                            footer { (PreEscaped(footer_html)) }
                        }
                    }
                    @for script in &self.config.scripts {
                        script type="text/javascript" src=(asset_url(ctx.root_url, script)) {}
                    }
                    @if let Some(snippet) = analytics {
                        (PreEscaped(snippet))
                    }
                }
            }
        }
    }
}

/// Resolve an asset reference against the site root; absolute URLs pass through
fn asset_url(root_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        path.to_string()
    } else {
        format!("{root_url}/{}", path.trim_start_matches('/'))
    }
}

fn is_local(root_url: &str) -> bool {
    root_url.contains("localhost") || root_url.contains("127.0.0.1")
}
