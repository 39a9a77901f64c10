//! Application context: the process-wide client handles
//!
//! The store client and clock are constructed once at startup and passed by
//! reference into every component, with an explicit init/dispose lifecycle
//! instead of global mutable handles.

use std::sync::Arc;

use rollcall_core::{
    AttendanceSubmitter, FallbackResolver, ProtocolConfig, Result, RollcallError, SessionStore,
    SystemTimeSource, TimeSource,
};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Context
// ----------------------------------------------------------------------------

/// Shared handles for one running app instance
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn SessionStore>,
    time: Arc<dyn TimeSource>,
    config: ProtocolConfig,
}

impl AppContext {
    /// Start building a context
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    pub fn time(&self) -> Arc<dyn TimeSource> {
        self.time.clone()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Build a submitter over this context's handles
    pub fn submitter(&self) -> AttendanceSubmitter {
        AttendanceSubmitter::new(self.store(), self.time())
    }

    /// Build a fallback resolver over this context's handles
    pub fn fallback_resolver(&self) -> FallbackResolver {
        FallbackResolver::new(self.store(), self.time())
    }

    /// Initialize the context.
    ///
    /// Runs the opportunistic expiry sweep; a failing sweep is storage
    /// hygiene lost, not an error.
    pub async fn init(&self) -> Result<()> {
        match self.store.purge_expired(self.time.now()).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "swept expired sessions"),
            Err(err) => warn!("expiry sweep failed: {}", err),
        }
        debug!("app context initialized");
        Ok(())
    }

    /// Tear down the context. Handles are reference-counted; this is the
    /// explicit end of their sanctioned lifetime.
    pub async fn dispose(&self) {
        debug!("app context disposed");
    }
}

// ----------------------------------------------------------------------------
// Builder
// ----------------------------------------------------------------------------

/// Builder for [`AppContext`]
pub struct AppContextBuilder {
    store: Option<Arc<dyn SessionStore>>,
    time: Arc<dyn TimeSource>,
    config: ProtocolConfig,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            time: Arc::new(SystemTimeSource::new()),
            config: ProtocolConfig::default(),
        }
    }

    /// Set the session store client
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the time source
    pub fn with_time(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Set the protocol configuration
    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the context
    pub fn build(self) -> Result<AppContext> {
        let store = self
            .store
            .ok_or_else(|| RollcallError::config_error("app context needs a session store"))?;
        Ok(AppContext {
            store,
            time: self.time,
            config: self.config,
        })
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::MemoryStore;

    #[tokio::test]
    async fn test_builder_requires_store() {
        assert!(AppContext::builder().build().is_err());
        assert!(AppContext::builder()
            .with_store(Arc::new(MemoryStore::new()))
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn test_init_survives_store_outage() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let ctx = AppContext::builder().with_store(store).build().unwrap();

        // the sweep failure is logged, not returned
        ctx.init().await.unwrap();
        ctx.dispose().await;
    }
}
