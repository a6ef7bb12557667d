//! Request handler module
//!
//! Responsible for request routing dispatch: rendered pages first, then
//! the legacy file route, then public assets.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
