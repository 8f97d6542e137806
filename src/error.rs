//! # Bus Error Types
//!
//! Structured error handling for the publisher cache using thiserror.
//! Every failure propagates straight to the immediate caller; nothing here is
//! retried or swallowed.

use thiserror::Error;

/// Errors surfaced by the handle cache, publishers and configuration loading
#[derive(Error, Debug)]
pub enum BusError {
    /// The transport rejected a connection string or topic at creation time
    #[error("Transport configuration error: {target}: {message}")]
    TransportConfiguration { target: String, message: String },

    /// A send failed after a sender handle was obtained
    #[error("Transport error: {topic}: {message}")]
    Transport { topic: String, message: String },

    /// The payload could not be represented as JSON
    #[error("Message serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },
}

impl BusError {
    /// Create a transport configuration error
    pub fn transport_configuration(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportConfiguration {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a transport (send) error
    pub fn transport(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create a message serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// True when the caller may re-request a publisher and try again
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<serde_json::Error> for BusError {
    fn from(err: serde_json::Error) -> Self {
        BusError::serialization(err.to_string())
    }
}

impl From<::config::ConfigError> for BusError {
    fn from(err: ::config::ConfigError) -> Self {
        BusError::configuration("config", err.to_string())
    }
}

/// Result type alias for bus operations
pub type BusResult<T> = Result<T, BusError>;
