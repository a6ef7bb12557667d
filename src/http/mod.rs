//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the page handlers and the
//! public asset server, independent of any specific route.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used entry points
pub use range::parse_range;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_options_response,
};
