// Application state module
// Immutable context shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::backend::Backend;
use crate::filter::Filter;

/// Application state
///
/// Built once at startup, requests only ever read it.
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn Backend>,
    pub filter: Filter,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>, filter: Filter) -> Self {
        Self {
            config,
            backend,
            filter,
        }
    }
}
