//! # Handle Cache
//!
//! Keyed pool of transport connections and per-topic senders.
//!
//! ## Lookup
//!
//! ```text
//! get_publisher(connection_string, topic)
//!     │
//!     ├─ fast path: live sender cached? ──────────────→ Publisher
//!     │
//!     └─ slow path:
//!          resolve connection (double-checked under its key lock)
//!          lock sender key
//!            ├─ live sender appeared meanwhile? ───────→ Publisher
//!            └─ create sender, replace closed entry ──→ Publisher
//! ```
//!
//! Reads never take a lock. Every insert happens under the lock for its own
//! key, so two callers only contend when they ask for the same connection or
//! the same (connection, topic) pair. Entries are never removed: a closed
//! handle is superseded by a new one under the same key.
//!
//! Connections are never closed by the cache. Their lifetime is whatever the
//! transport gives them; the transport owns its own resource limits and the
//! cache only notices closure and reconnects.

pub mod key;
pub mod metrics;

pub use key::{ConnectionKey, SenderKey};
pub use metrics::CacheMetrics;

use crate::error::BusResult;
use crate::logging::log_cache_operation;
use crate::publisher::{MessageBusFactory, Publisher};
use crate::transport::{ConnectionHandle, SenderHandle, Transport, TransportConfig};
use dashmap::DashMap;
use metrics::CacheCounters;
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Cached sender plus the connection it was created on
#[derive(Clone)]
struct SenderEntry {
    sender: Arc<dyn SenderHandle>,
    connection_id: Uuid,
}

impl SenderEntry {
    fn is_live(&self) -> bool {
        !self.sender.is_closed()
    }

    fn publisher(&self) -> Publisher {
        Publisher::new(Arc::clone(&self.sender), self.connection_id)
    }
}

/// One creation lock per key
struct KeyedLocks<K: Eq + Hash> {
    slots: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// The slot guard is released before the caller locks the returned mutex
    fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(
            self.slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}

/// Connection and sender handle cache in front of a message-bus transport
pub struct HandleCache {
    transport: Arc<dyn Transport>,
    transport_config: TransportConfig,
    connections: DashMap<ConnectionKey, Arc<dyn ConnectionHandle>>,
    senders: DashMap<SenderKey, SenderEntry>,
    connection_locks: KeyedLocks<ConnectionKey>,
    sender_locks: KeyedLocks<SenderKey>,
    counters: CacheCounters,
}

impl HandleCache {
    /// Create a cache opening every connection with `transport_config`
    pub fn new(transport: Arc<dyn Transport>, transport_config: TransportConfig) -> Self {
        info!(
            transport = %transport.name(),
            transport_type = %transport_config.transport_type,
            "🚀 HANDLE CACHE: Created"
        );

        Self {
            transport,
            transport_config,
            connections: DashMap::new(),
            senders: DashMap::new(),
            connection_locks: KeyedLocks::new(),
            sender_locks: KeyedLocks::new(),
            counters: CacheCounters::default(),
        }
    }

    /// Return a publisher bound to a live sender for `topic` on `connection_string`
    ///
    /// Creates and caches the connection and/or sender on first use, and
    /// replaces either one when the transport reports it closed. Creation
    /// failures are returned as-is and leave no registry entry behind.
    pub fn get_publisher(&self, connection_string: &str, topic: &str) -> BusResult<Publisher> {
        let key = SenderKey::new(connection_string, topic);

        if let Some(entry) = self.live_sender(&key) {
            CacheCounters::incr(&self.counters.fast_path_hits);
            return Ok(entry.publisher());
        }

        let connection = self.resolve_connection(key.connection())?;

        let slot = self.sender_locks.slot(&key);
        let _guard = slot.lock();

        if let Some(entry) = self.live_sender(&key) {
            CacheCounters::incr(&self.counters.locked_path_hits);
            debug!(sender_key = %key, "🔁 HANDLE CACHE: Sender created by concurrent caller");
            return Ok(entry.publisher());
        }

        let sender = connection.create_sender(key.topic())?;
        let entry = SenderEntry {
            sender,
            connection_id: connection.handle_id(),
        };
        CacheCounters::incr(&self.counters.senders_created);

        match self.senders.insert(key.clone(), entry.clone()) {
            Some(stale) => {
                stale.sender.dispose();
                CacheCounters::incr(&self.counters.senders_replaced);
                log_cache_operation(
                    "replace_sender",
                    &key.to_string(),
                    "replaced",
                    Some(&format!(
                        "closed sender {} disposed, new sender {}",
                        stale.sender.handle_id(),
                        entry.sender.handle_id()
                    )),
                );
            }
            None => {
                log_cache_operation(
                    "create_sender",
                    &key.to_string(),
                    "created",
                    Some(&format!("sender {}", entry.sender.handle_id())),
                );
            }
        }

        Ok(entry.publisher())
    }

    /// Return the live connection for `key`, opening one if absent or closed
    fn resolve_connection(&self, key: &ConnectionKey) -> BusResult<Arc<dyn ConnectionHandle>> {
        if let Some(connection) = self.live_connection(key) {
            return Ok(connection);
        }

        let slot = self.connection_locks.slot(key);
        let _guard = slot.lock();

        if let Some(connection) = self.live_connection(key) {
            return Ok(connection);
        }

        let connection = self
            .transport
            .open_connection(key.as_str(), &self.transport_config)?;
        CacheCounters::incr(&self.counters.connections_opened);

        let status = match self.connections.insert(key.clone(), Arc::clone(&connection)) {
            Some(_) => {
                CacheCounters::incr(&self.counters.connections_replaced);
                "replaced"
            }
            None => "opened",
        };
        log_cache_operation(
            "open_connection",
            &key.to_string(),
            status,
            Some(&format!("connection {}", connection.handle_id())),
        );

        Ok(connection)
    }

    fn live_sender(&self, key: &SenderKey) -> Option<SenderEntry> {
        self.senders
            .get(key)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value().clone())
    }

    fn live_connection(&self, key: &ConnectionKey) -> Option<Arc<dyn ConnectionHandle>> {
        self.connections
            .get(key)
            .filter(|connection| !connection.is_closed())
            .map(|connection| Arc::clone(connection.value()))
    }

    pub fn transport_config(&self) -> &TransportConfig {
        &self.transport_config
    }

    /// Number of connection entries, closed ones included
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of sender entries, closed ones included
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.counters
            .snapshot(self.connection_count(), self.sender_count())
    }
}

impl fmt::Debug for HandleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleCache")
            .field("transport", &self.transport.name())
            .field("transport_config", &self.transport_config)
            .field("connections", &self.connections.len())
            .field("senders", &self.senders.len())
            .finish()
    }
}

impl MessageBusFactory for HandleCache {
    fn get_client(&self, connection_string: &str, topic: &str) -> BusResult<Publisher> {
        self.get_publisher(connection_string, topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use crate::transport::{MemoryTransport, TransportType};

    fn cache_with(transport: &MemoryTransport) -> HandleCache {
        HandleCache::new(Arc::new(transport.clone()), TransportConfig::default())
    }

    #[test]
    fn test_second_lookup_uses_fast_path() {
        let transport = MemoryTransport::new();
        let cache = cache_with(&transport);

        let first = cache.get_publisher("conn-A", "topic-1").unwrap();
        let second = cache.get_publisher("conn-A", "topic-1").unwrap();

        assert_eq!(first.sender_id(), second.sender_id());
        assert_eq!(transport.connections_opened(), 1);
        assert_eq!(transport.senders_created(), 1);

        let metrics = cache.metrics();
        assert_eq!(metrics.fast_path_hits, 1);
        assert_eq!(metrics.senders_created, 1);
        assert_eq!(metrics.sender_count, 1);
    }

    #[test]
    fn test_connections_open_with_configured_transport() {
        let transport = MemoryTransport::new();
        let config = TransportConfig {
            transport_type: TransportType::AmqpWebSockets,
            client_identifier: Some("billing".to_string()),
        };
        let cache = HandleCache::new(Arc::new(transport.clone()), config.clone());

        let publisher = cache.get_publisher("conn-A", "topic-1").unwrap();
        let connection = transport.connection(publisher.connection_id()).unwrap();

        assert_eq!(connection.config(), &config);
        assert_eq!(cache.transport_config(), &config);
    }

    #[test]
    fn test_closed_sender_is_disposed_and_replaced() {
        let transport = MemoryTransport::new();
        let cache = cache_with(&transport);

        let first = cache.get_publisher("conn-A", "topic-1").unwrap();
        transport.sender(first.sender_id()).unwrap().close();

        let second = cache.get_publisher("conn-A", "topic-1").unwrap();

        assert_ne!(first.sender_id(), second.sender_id());
        assert_eq!(first.connection_id(), second.connection_id());
        assert!(transport.sender(first.sender_id()).unwrap().is_disposed());
        assert_eq!(cache.sender_count(), 1);
        assert_eq!(cache.metrics().senders_replaced, 1);
    }

    #[test]
    fn test_closed_connection_is_reopened() {
        let transport = MemoryTransport::new();
        let cache = cache_with(&transport);

        let first = cache.get_publisher("conn-A", "topic-1").unwrap();
        transport.connection(first.connection_id()).unwrap().close();

        let second = cache.get_publisher("conn-A", "topic-1").unwrap();

        assert_ne!(first.connection_id(), second.connection_id());
        assert_ne!(first.sender_id(), second.sender_id());
        assert!(!second.is_closed());
        assert_eq!(cache.connection_count(), 1);

        let metrics = cache.metrics();
        assert_eq!(metrics.connections_opened, 2);
        assert_eq!(metrics.connections_replaced, 1);
        assert_eq!(metrics.senders_replaced, 1);
    }

    #[test]
    fn test_sender_creation_failure_leaves_no_entry() {
        let transport = MemoryTransport::new();
        transport.reject_topic("missing");
        let cache = cache_with(&transport);

        let err = cache.get_publisher("conn-A", "missing").unwrap_err();

        assert!(matches!(err, BusError::TransportConfiguration { .. }));
        assert_eq!(cache.sender_count(), 0);
        // The connection itself was fine and stays cached
        assert_eq!(cache.connection_count(), 1);
    }

    #[test]
    fn test_debug_output_omits_connection_strings() {
        let transport = MemoryTransport::new();
        let cache = cache_with(&transport);
        cache
            .get_publisher("Endpoint=sb://a/;SharedAccessKey=secret", "orders")
            .unwrap();

        let shown = format!("{cache:?}");
        assert!(shown.contains("memory"));
        assert!(!shown.contains("secret"));
    }
}
