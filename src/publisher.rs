//! # Publisher
//!
//! Thin facade over one cached sender handle. Serializes a payload to JSON,
//! wraps it in an [`Envelope`] and waits for the transport to accept it.
//! Failures are returned to the caller untouched; nothing is retried and the
//! cache is never mutated from here. A publisher whose sender was closed
//! keeps failing until the caller asks the cache for a fresh one.

use crate::error::BusResult;
use crate::transport::{Envelope, SenderHandle};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Publishes messages to one destination
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Serialize `message` as JSON and send it
    async fn publish_message<T: Serialize + Sync + ?Sized>(&self, message: &T) -> BusResult<()>;
}

/// Hands out [`MessageBus`] clients for a connection string and topic
pub trait MessageBusFactory: Send + Sync {
    fn get_client(&self, connection_string: &str, topic: &str) -> BusResult<Publisher>;
}

/// Publisher bound to one sender handle
#[derive(Clone)]
pub struct Publisher {
    sender: Arc<dyn SenderHandle>,
    connection_id: Uuid,
}

impl Publisher {
    pub(crate) fn new(sender: Arc<dyn SenderHandle>, connection_id: Uuid) -> Self {
        Self {
            sender,
            connection_id,
        }
    }

    pub fn topic(&self) -> &str {
        self.sender.topic()
    }

    /// Identity of the bound sender handle
    pub fn sender_id(&self) -> Uuid {
        self.sender.handle_id()
    }

    /// Identity of the connection the sender was created on
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Serialize `message` to JSON and send it
    pub async fn publish<T: Serialize + ?Sized>(&self, message: &T) -> BusResult<()> {
        let body = serde_json::to_vec(message)?;
        self.publish_bytes(body).await
    }

    /// Send an already-serialized JSON body
    pub async fn publish_bytes(&self, body: impl Into<Vec<u8>>) -> BusResult<()> {
        let envelope = Envelope::json(body.into());
        let message_id = envelope.message_id;
        let size_bytes = envelope.len();

        self.sender.send(envelope).await?;

        debug!(
            topic = %self.topic(),
            message_id = %message_id,
            size_bytes = size_bytes,
            "📤 Message published"
        );
        Ok(())
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("topic", &self.topic())
            .field("sender_id", &self.sender_id())
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

#[async_trait]
impl MessageBus for Publisher {
    async fn publish_message<T: Serialize + Sync + ?Sized>(&self, message: &T) -> BusResult<()> {
        self.publish(message).await
    }
}
