//! Content router
//!
//! Decides what a request gets: a redirect (default page, moved content) or
//! a file to render together with its title and site URLs. The decision is a
//! plain value; turning it into headers and a body is the HTTP layer's job.

use std::io;
use std::path::{Component, Path, PathBuf};

use super::extension::{find_file, is_regular_file};
use super::redirect::RedirectTable;
use super::resolver::{self, RequestParts, RequestPath};
use crate::config::SiteConfig;

/// Title given to the not-found page
pub const NOT_FOUND_TITLE: &str = "404";

/// Why the router asked for a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The request named no page
    DefaultPath,
    /// The page moved, per the redirect table
    Moved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Found,
    NotFound,
}

/// File selected for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub logical_path: String,
    pub file_path: PathBuf,
    pub title: String,
    pub root_url: String,
    pub index_url: String,
    pub status: TargetStatus,
}

/// Outcome of routing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Redirect {
        location: String,
        reason: RedirectReason,
    },
    Render(ResolvedTarget),
}

/// Resolves requests against the content root; built once, shared by all requests
#[derive(Debug, Clone)]
pub struct Router {
    site: SiteConfig,
    content_root: PathBuf,
    redirects: RedirectTable,
}

impl Router {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            site: site.clone(),
            content_root: PathBuf::from(&site.content_root),
            redirects: RedirectTable::new(&site.redirects),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub const fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    /// Route a request
    ///
    /// Only filesystem failures other than "not found" produce an error.
    pub fn route(&self, parts: RequestParts<'_>) -> io::Result<Decision> {
        let request = resolver::resolve(parts, &self.site);

        if request.is_default {
            return Ok(Decision::Redirect {
                location: request.link_to(&request.logical_path),
                reason: RedirectReason::DefaultPath,
            });
        }

        if let Some(file_path) = self.existing_file(&request.logical_path)? {
            let title = resolver::title(&request.logical_path);
            return Ok(Decision::Render(Self::target(
                request,
                file_path,
                title,
                TargetStatus::Found,
            )));
        }

        if let Some(new_path) = self.redirects.lookup(&request.logical_path) {
            return Ok(Decision::Redirect {
                location: request.link_to(new_path),
                reason: RedirectReason::Moved,
            });
        }

        let file_path = self.content_root.join(&self.site.not_found_file);
        Ok(Decision::Render(Self::target(
            request,
            file_path,
            NOT_FOUND_TITLE.to_string(),
            TargetStatus::NotFound,
        )))
    }

    /// Regular file backing a logical path, if any; directories do not count
    fn existing_file(&self, logical_path: &str) -> io::Result<Option<PathBuf>> {
        if !is_contained(logical_path) {
            return Ok(None);
        }

        match find_file(
            &self.content_root,
            logical_path,
            &self.site.candidate_extensions,
        )? {
            Some(path) if is_regular_file(&path)? => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    fn target(
        request: RequestPath,
        file_path: PathBuf,
        title: String,
        status: TargetStatus,
    ) -> ResolvedTarget {
        ResolvedTarget {
            logical_path: request.logical_path,
            file_path,
            title,
            root_url: request.root_url,
            index_url: request.index_url,
            status,
        }
    }
}

/// Whether a logical path stays below the content root
fn is_contained(logical_path: &str) -> bool {
    !logical_path.contains('\0')
        && Path::new(logical_path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
