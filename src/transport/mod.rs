//! # Transport Seam
//!
//! Traits implemented by the managed message-bus SDK sitting underneath the
//! handle cache. The cache only ever needs to open a connection, create a
//! sender on it, send an envelope and ask either handle whether the transport
//! has closed it.
//!
//! Connection and sender creation are synchronous: AMQP client SDKs build
//! their links lazily, so creating a handle is cheap bookkeeping while the
//! actual network work happens on the first send. Sending is async.

pub mod config;
pub mod envelope;
pub mod memory;

pub use config::{TransportConfig, TransportType};
pub use envelope::Envelope;
pub use memory::{MemoryConnection, MemorySender, MemoryTransport};

use crate::error::BusResult;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Entry point of an external transport: opens connections from connection strings
pub trait Transport: Send + Sync {
    /// Transport name used in log records
    fn name(&self) -> &str;

    /// Open a connection for `connection_string`
    ///
    /// Rejected or unreachable endpoints fail with
    /// [`BusError::TransportConfiguration`](crate::BusError::TransportConfiguration).
    fn open_connection(
        &self,
        connection_string: &str,
        config: &TransportConfig,
    ) -> BusResult<Arc<dyn ConnectionHandle>>;
}

/// An open transport connection shared by every sender created on it
pub trait ConnectionHandle: Send + Sync {
    /// Stable identity of this handle, unique per opened connection
    fn handle_id(&self) -> Uuid;

    /// Whether the transport has torn this connection down
    fn is_closed(&self) -> bool;

    /// Create a sender bound to `topic` on this connection
    fn create_sender(&self, topic: &str) -> BusResult<Arc<dyn SenderHandle>>;

    /// Release the connection's resources
    fn dispose(&self);
}

/// A sender bound to one topic on one connection
#[async_trait]
pub trait SenderHandle: Send + Sync {
    /// Stable identity of this handle, unique per created sender
    fn handle_id(&self) -> Uuid;

    fn topic(&self) -> &str;

    /// Whether the transport has closed this sender (or its connection)
    fn is_closed(&self) -> bool;

    /// Transmit one envelope and wait for the transport to acknowledge it
    async fn send(&self, envelope: Envelope) -> BusResult<()>;

    /// Release the sender's link
    fn dispose(&self);
}
