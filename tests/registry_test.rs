//! Integration test for the process-wide factory registration
//!
//! Kept in its own test binary so the global singleton starts unregistered.

use bus_publisher_cache::registry::{message_bus_factory, register_message_bus_factory};
use bus_publisher_cache::transport::MemoryTransport;
use bus_publisher_cache::{BusError, PublisherCacheConfig, TransportType};
use std::sync::Arc;

#[test]
fn test_global_factory_registration_lifecycle() {
    let err = message_bus_factory().unwrap_err();
    assert!(matches!(err, BusError::Configuration { .. }));

    let transport = MemoryTransport::new();
    let config = PublisherCacheConfig::default();
    let registered = register_message_bus_factory(Arc::new(transport.clone()), &config);

    let looked_up = message_bus_factory().unwrap();
    assert!(Arc::ptr_eq(&registered, &looked_up));
    assert_eq!(
        looked_up.transport_config().transport_type,
        TransportType::AmqpTcp
    );

    // Later registrations return the first instance
    let mut other_config = PublisherCacheConfig::default();
    other_config.transport.transport_type = TransportType::AmqpWebSockets;
    let second = register_message_bus_factory(Arc::new(MemoryTransport::new()), &other_config);
    assert!(Arc::ptr_eq(&registered, &second));
    assert_eq!(
        second.transport_config().transport_type,
        TransportType::AmqpTcp
    );

    second.get_publisher("conn-A", "topic-1").unwrap();
    assert_eq!(transport.senders_created(), 1);
}
