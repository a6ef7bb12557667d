// Application state module
// Immutable per-process state shared by every connection task

use super::types::Config;

/// Application state
///
/// Configuration is fixed for the lifetime of the process, so handlers
/// read it directly without locking.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}
