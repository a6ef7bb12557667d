//! Web frontend for the community board: server-side rendered pages
//! plus static assets served from the `public` directory.
//!
//! The binary in `main.rs` wires configuration, logging, and the
//! accept loop together; everything else lives here so the handler
//! stack can be exercised directly in tests.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod views;
