//! # Factory Registration
//!
//! Process-wide access to a single [`HandleCache`]. Hosts either register the
//! cache once at startup and look it up anywhere through
//! [`message_bus_factory`], or keep a [`FactoryProvider`] in their own
//! dependency container.

use crate::cache::HandleCache;
use crate::config::PublisherCacheConfig;
use crate::error::{BusError, BusResult};
use crate::transport::{Transport, TransportConfig};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Global handle cache singleton
static GLOBAL_FACTORY: OnceLock<Arc<HandleCache>> = OnceLock::new();

/// Lazily builds one cache and hands out the same instance forever after
pub struct FactoryProvider {
    transport: Arc<dyn Transport>,
    transport_config: TransportConfig,
    instance: OnceLock<Arc<HandleCache>>,
}

impl FactoryProvider {
    pub fn new(transport: Arc<dyn Transport>, config: &PublisherCacheConfig) -> Self {
        Self {
            transport,
            transport_config: config.transport.clone(),
            instance: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Arc<HandleCache> {
        self.instance
            .get_or_init(|| {
                Arc::new(HandleCache::new(
                    Arc::clone(&self.transport),
                    self.transport_config.clone(),
                ))
            })
            .clone()
    }
}

/// Register the process-wide handle cache
///
/// The first registration wins; later calls return the already registered
/// instance and ignore their arguments.
pub fn register_message_bus_factory(
    transport: Arc<dyn Transport>,
    config: &PublisherCacheConfig,
) -> Arc<HandleCache> {
    if let Some(existing) = GLOBAL_FACTORY.get() {
        debug!("Handle cache already registered - returning existing instance");
        return Arc::clone(existing);
    }

    GLOBAL_FACTORY
        .get_or_init(|| {
            info!("🎯 GLOBAL HANDLE CACHE: Registering singleton");
            FactoryProvider::new(transport, config).get()
        })
        .clone()
}

/// The registered process-wide handle cache
pub fn message_bus_factory() -> BusResult<Arc<HandleCache>> {
    GLOBAL_FACTORY.get().cloned().ok_or_else(|| {
        BusError::configuration(
            "registry",
            "message bus factory has not been registered",
        )
    })
}
