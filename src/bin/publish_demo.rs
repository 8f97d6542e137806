//! Publishes a sample message through the process-wide handle cache.
//!
//! Runs against the in-memory transport so it needs no broker:
//!
//! ```bash
//! BUSCACHE_ENVIRONMENT=development cargo run --bin publish-demo
//! ```

use anyhow::Context;
use bus_publisher_cache::config::PublisherCacheConfig;
use bus_publisher_cache::logging::{init_structured_logging, log_error};
use bus_publisher_cache::registry::{message_bus_factory, register_message_bus_factory};
use bus_publisher_cache::transport::MemoryTransport;
use bus_publisher_cache::MessageBusFactory;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const DEMO_CONNECTION_STRING: &str =
    "Endpoint=sb://demo.servicebus.local/;SharedAccessKeyName=send;SharedAccessKey=ZGVtbw==";
const DEMO_TOPIC: &str = "people";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Person<'a> {
    first_name: &'a str,
    last_name: &'a str,
}

struct App {
    factory: Arc<dyn MessageBusFactory>,
}

impl App {
    async fn run(&self) -> anyhow::Result<()> {
        let client = self
            .factory
            .get_client(DEMO_CONNECTION_STRING, DEMO_TOPIC)
            .context("failed to obtain publisher")?;

        client
            .publish(&Person {
                first_name: "Bob",
                last_name: "Smith",
            })
            .await
            .context("failed to publish message")?;

        info!(topic = %client.topic(), "✅ Demo message published");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PublisherCacheConfig::from_env().context("failed to load configuration")?;
    init_structured_logging(&config);

    let transport = MemoryTransport::new();
    register_message_bus_factory(Arc::new(transport.clone()), &config);

    let app = App {
        factory: message_bus_factory()?,
    };

    if let Err(e) = app.run().await {
        log_error("publish_demo", "run", &format!("{e:#}"), None);
        return Err(e);
    }

    for envelope in transport.sent_to(DEMO_TOPIC) {
        info!(
            message_id = %envelope.message_id,
            body = envelope.body_str().unwrap_or("<binary>"),
            "📨 Delivered to in-memory transport"
        );
    }

    Ok(())
}
