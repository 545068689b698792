//! Routing module
//!
//! Content resolution for the documentation site:
//! - Request path and title resolution
//! - Candidate extension matching against the content root
//! - Redirect table for retired paths
//! - The router combining them into a single decision

mod extension;
mod redirect;
mod resolver;
mod router;

pub use redirect::RedirectTable;
pub use resolver::RequestParts;
pub use router::{Decision, RedirectReason, ResolvedTarget, Router, TargetStatus};
