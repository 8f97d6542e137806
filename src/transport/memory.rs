//! # In-Memory Transport
//!
//! Loopback implementation of the transport seam. Connections and senders live
//! in process memory, every creation call is counted and every sent envelope
//! is recorded, and any handle can be closed on demand to simulate the broker
//! tearing it down. Used by the test suite, the benchmark and the demo binary.

use super::{ConnectionHandle, Envelope, SenderHandle, Transport, TransportConfig};
use crate::error::{BusError, BusResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Counters and failure rules shared by the transport and its connections
#[derive(Debug, Default)]
struct Ledger {
    connections_opened: AtomicUsize,
    senders_created: AtomicUsize,
    rejected_endpoints: Mutex<HashSet<String>>,
    rejected_topics: Mutex<HashSet<String>>,
    creation_delay: Mutex<Option<Duration>>,
}

impl Ledger {
    fn simulate_creation_latency(&self) {
        let delay = *self.creation_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
    }
}

/// Loopback transport; cloning shares the same state
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    ledger: Arc<Ledger>,
    connections: Arc<Mutex<Vec<Arc<MemoryConnection>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every connection and sender creation call
    pub fn with_creation_delay(self, delay: Duration) -> Self {
        *self.ledger.creation_delay.lock() = Some(delay);
        self
    }

    /// Make `open_connection` fail for this connection string
    pub fn reject_endpoint(&self, connection_string: impl Into<String>) {
        self.ledger
            .rejected_endpoints
            .lock()
            .insert(connection_string.into());
    }

    /// Make `create_sender` fail for this topic on every connection
    pub fn reject_topic(&self, topic: impl Into<String>) {
        self.ledger.rejected_topics.lock().insert(topic.into());
    }

    /// Number of successful `open_connection` calls
    pub fn connections_opened(&self) -> usize {
        self.ledger.connections_opened.load(Ordering::SeqCst)
    }

    /// Number of successful `create_sender` calls across all connections
    pub fn senders_created(&self) -> usize {
        self.ledger.senders_created.load(Ordering::SeqCst)
    }

    pub fn connections(&self) -> Vec<Arc<MemoryConnection>> {
        self.connections.lock().clone()
    }

    pub fn senders(&self) -> Vec<Arc<MemorySender>> {
        self.connections
            .lock()
            .iter()
            .flat_map(|connection| connection.senders())
            .collect()
    }

    pub fn sender(&self, handle_id: Uuid) -> Option<Arc<MemorySender>> {
        self.senders()
            .into_iter()
            .find(|sender| sender.id == handle_id)
    }

    pub fn connection(&self, handle_id: Uuid) -> Option<Arc<MemoryConnection>> {
        self.connections
            .lock()
            .iter()
            .find(|connection| connection.id == handle_id)
            .cloned()
    }

    /// Every envelope sent to `topic`, across all senders, in creation order of the senders
    pub fn sent_to(&self, topic: &str) -> Vec<Envelope> {
        self.senders()
            .iter()
            .filter(|sender| sender.topic == topic)
            .flat_map(|sender| sender.sent())
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    fn open_connection(
        &self,
        connection_string: &str,
        config: &TransportConfig,
    ) -> BusResult<Arc<dyn ConnectionHandle>> {
        if connection_string.is_empty() {
            return Err(BusError::transport_configuration(
                "connection",
                "connection string must not be empty",
            ));
        }
        if self
            .ledger
            .rejected_endpoints
            .lock()
            .contains(connection_string)
        {
            return Err(BusError::transport_configuration(
                "connection",
                "endpoint is unreachable",
            ));
        }

        self.ledger.simulate_creation_latency();

        let connection = Arc::new(MemoryConnection {
            id: Uuid::new_v4(),
            connection_string: connection_string.to_string(),
            config: config.clone(),
            closed: Arc::new(AtomicBool::new(false)),
            disposed: AtomicBool::new(false),
            senders: Mutex::new(Vec::new()),
            ledger: Arc::clone(&self.ledger),
        });
        self.ledger.connections_opened.fetch_add(1, Ordering::SeqCst);
        self.connections.lock().push(Arc::clone(&connection));

        debug!(connection_id = %connection.id, "🔌 MEMORY TRANSPORT: connection opened");
        Ok(connection)
    }
}

#[derive(Debug)]
pub struct MemoryConnection {
    id: Uuid,
    connection_string: String,
    config: TransportConfig,
    closed: Arc<AtomicBool>,
    disposed: AtomicBool,
    senders: Mutex<Vec<Arc<MemorySender>>>,
    ledger: Arc<Ledger>,
}

impl MemoryConnection {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Options the connection was opened with
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Simulate the broker tearing the connection down; its senders report closed too
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn senders(&self) -> Vec<Arc<MemorySender>> {
        self.senders.lock().clone()
    }
}

impl ConnectionHandle for MemoryConnection {
    fn handle_id(&self) -> Uuid {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn create_sender(&self, topic: &str) -> BusResult<Arc<dyn SenderHandle>> {
        if self.is_closed() {
            return Err(BusError::transport_configuration(
                topic,
                "connection is closed",
            ));
        }
        if topic.is_empty() {
            return Err(BusError::transport_configuration(
                "topic",
                "topic must not be empty",
            ));
        }
        if self.ledger.rejected_topics.lock().contains(topic) {
            return Err(BusError::transport_configuration(
                topic,
                "topic does not exist",
            ));
        }

        self.ledger.simulate_creation_latency();

        let sender = Arc::new(MemorySender {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            connection_id: self.id,
            closed: AtomicBool::new(false),
            connection_closed: Arc::clone(&self.closed),
            disposed: AtomicBool::new(false),
            failing: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        });
        self.ledger.senders_created.fetch_add(1, Ordering::SeqCst);
        self.senders.lock().push(Arc::clone(&sender));

        debug!(sender_id = %sender.id, topic = %topic, "🔗 MEMORY TRANSPORT: sender created");
        Ok(sender)
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.close();
    }
}

#[derive(Debug)]
pub struct MemorySender {
    id: Uuid,
    topic: String,
    connection_id: Uuid,
    closed: AtomicBool,
    connection_closed: Arc<AtomicBool>,
    disposed: AtomicBool,
    failing: AtomicBool,
    sent: Mutex<Vec<Envelope>>,
}

impl MemorySender {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Connection this sender was created on
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Simulate the broker detaching this sender's link
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// While set, every send fails with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SenderHandle for MemorySender {
    fn handle_id(&self) -> Uuid {
        self.id
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.connection_closed.load(Ordering::SeqCst)
    }

    async fn send(&self, envelope: Envelope) -> BusResult<()> {
        if self.is_closed() {
            return Err(BusError::transport(&self.topic, "sender is closed"));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(BusError::transport(&self.topic, "simulated network fault"));
        }

        self.sent.lock().push(envelope);
        Ok(())
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_connection_counts_and_records_config() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default().with_client_identifier("billing");

        let connection = transport.open_connection("Endpoint=sb://a/", &config).unwrap();
        assert!(!connection.is_closed());
        assert_eq!(transport.connections_opened(), 1);

        let recorded = transport.connection(connection.handle_id()).unwrap();
        assert_eq!(recorded.config(), &config);
        assert_eq!(recorded.connection_string(), "Endpoint=sb://a/");
    }

    #[test]
    fn test_rejections_surface_transport_configuration_errors() {
        let transport = MemoryTransport::new();
        transport.reject_endpoint("Endpoint=sb://down/");
        transport.reject_topic("missing");

        let err = transport
            .open_connection("Endpoint=sb://down/", &TransportConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, BusError::TransportConfiguration { .. }));

        let err = transport
            .open_connection("", &TransportConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, BusError::TransportConfiguration { .. }));

        let connection = transport
            .open_connection("Endpoint=sb://up/", &TransportConfig::default())
            .unwrap();
        assert!(connection.create_sender("missing").is_err());
        assert!(connection.create_sender("").is_err());
        assert_eq!(transport.senders_created(), 0);
    }

    #[test]
    fn test_closing_connection_closes_its_senders() {
        let transport = MemoryTransport::new();
        let connection = transport
            .open_connection("Endpoint=sb://a/", &TransportConfig::default())
            .unwrap();
        let sender = connection.create_sender("orders").unwrap();
        assert!(!sender.is_closed());

        transport.connection(connection.handle_id()).unwrap().close();

        assert!(connection.is_closed());
        assert!(sender.is_closed());
        assert!(connection.create_sender("orders").is_err());
    }

    #[tokio::test]
    async fn test_send_records_envelopes_until_closed() {
        let transport = MemoryTransport::new();
        let connection = transport
            .open_connection("Endpoint=sb://a/", &TransportConfig::default())
            .unwrap();
        let sender = connection.create_sender("orders").unwrap();

        sender.send(Envelope::json(b"{}".to_vec())).await.unwrap();
        assert_eq!(transport.sent_to("orders").len(), 1);

        let memory_sender = transport.sender(sender.handle_id()).unwrap();
        memory_sender.set_failing(true);
        let err = sender.send(Envelope::json(b"{}".to_vec())).await.unwrap_err();
        assert!(err.is_transport());

        memory_sender.set_failing(false);
        sender.dispose();
        assert!(memory_sender.is_disposed());
        assert!(sender.send(Envelope::json(b"{}".to_vec())).await.is_err());
        assert_eq!(transport.sent_to("orders").len(), 1);
    }
}
