#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Bus Publisher Cache
//!
//! Connection and sender handle cache for publishing to a managed message bus.
//!
//! ## Overview
//!
//! Given a connection string and a destination topic, the [`HandleCache`]
//! returns a ready-to-use [`Publisher`]. The underlying transport connection and
//! the per-topic sender are created lazily, reused across calls, and replaced
//! transparently when the transport closes them.
//!
//! ## Module Organization
//!
//! - [`cache`] - Keyed connection/sender registries with per-key creation locks
//! - [`publisher`] - Publisher facade plus the `MessageBus` / `MessageBusFactory` traits
//! - [`transport`] - Transport seam, transport options, envelopes and an in-memory transport
//! - [`registry`] - Process-wide singleton registration of the cache
//! - [`config`] - Layered configuration (defaults, file, environment)
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bus_publisher_cache::config::PublisherCacheConfig;
//! use bus_publisher_cache::registry::register_message_bus_factory;
//! use bus_publisher_cache::transport::MemoryTransport;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PublisherCacheConfig::from_env()?;
//! let cache = register_message_bus_factory(Arc::new(MemoryTransport::new()), &config);
//!
//! let publisher = cache.get_publisher("Endpoint=sb://contoso/;SharedAccessKey=...", "people")?;
//! publisher
//!     .publish(&serde_json::json!({"FirstName": "Bob", "LastName": "Smith"}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod publisher;
pub mod registry;
pub mod transport;

pub use cache::{CacheMetrics, ConnectionKey, HandleCache, SenderKey};
pub use config::PublisherCacheConfig;
pub use error::{BusError, BusResult};
pub use publisher::{MessageBus, MessageBusFactory, Publisher};
pub use transport::{
    ConnectionHandle, Envelope, SenderHandle, Transport, TransportConfig, TransportType,
};
