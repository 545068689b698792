//! Request handler module
//!
//! Dispatches requests to static assets or to the content router and turns
//! routing decisions into HTTP responses.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
