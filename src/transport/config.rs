//! Transport options applied to every connection the cache opens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire transport used for connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// AMQP over a raw TCP stream
    #[default]
    AmqpTcp,
    /// AMQP tunnelled through websockets on port 443
    AmqpWebSockets,
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportType::AmqpTcp => write!(f, "amqp_tcp"),
            TransportType::AmqpWebSockets => write!(f, "amqp_web_sockets"),
        }
    }
}

/// Options passed to [`Transport::open_connection`](super::Transport::open_connection)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub transport_type: TransportType,
    /// Client identifier reported to the broker, if any
    pub client_identifier: Option<String>,
}

impl TransportConfig {
    pub fn with_client_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.client_identifier = Some(identifier.into());
        self
    }
}
