//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::store::{DynStore, Store};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the injected storage adapter.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: DynStore,
}

impl AppState {
    /// Create a new application state over a storage adapter.
    #[must_use]
    pub fn new(config: Config, store: DynStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the storage adapter.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }
}
