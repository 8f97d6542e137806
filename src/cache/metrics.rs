//! Lifecycle counters for the handle cache.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    pub connections_opened: AtomicU64,
    pub connections_replaced: AtomicU64,
    pub senders_created: AtomicU64,
    pub senders_replaced: AtomicU64,
    pub fast_path_hits: AtomicU64,
    pub locked_path_hits: AtomicU64,
}

impl CacheCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, connection_count: usize, sender_count: usize) -> CacheMetrics {
        CacheMetrics {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_replaced: self.connections_replaced.load(Ordering::Relaxed),
            senders_created: self.senders_created.load(Ordering::Relaxed),
            senders_replaced: self.senders_replaced.load(Ordering::Relaxed),
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            locked_path_hits: self.locked_path_hits.load(Ordering::Relaxed),
            connection_count,
            sender_count,
        }
    }
}

/// Point-in-time view of the cache for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Connections opened through the transport, replacements included
    pub connections_opened: u64,
    /// Closed connections superseded by a new one
    pub connections_replaced: u64,
    /// Senders created through the transport, replacements included
    pub senders_created: u64,
    /// Closed senders disposed and superseded by a new one
    pub senders_replaced: u64,
    /// Lookups served without taking a lock
    pub fast_path_hits: u64,
    /// Lookups that found a live sender only after waiting on the key lock
    pub locked_path_hits: u64,
    pub connection_count: usize,
    pub sender_count: usize,
}
