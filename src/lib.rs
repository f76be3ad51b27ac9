//! Dynamic listener registration and fire-and-forget publishing on top of a
//! message middleware.
//!
//! ### Features
//!
//! - Listeners are plain closures taking the decoded payload; they can be
//!   registered under any topic and consumer group at any point in the
//!   process lifetime, and every registration gets its own id.
//! - Producers take the destination topic per send and hand records off
//!   without waiting for delivery.
//! - An in-memory middleware ships alongside the Kafka one, so the whole
//!   layer runs in tests without a broker.
//!
//! ### Examples
//!
//! ```no_run
//! use msgbridge::prelude::*;
//! use std::sync::Arc;
//! use tokio::signal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     env_logger::init();
//!     let mut config = BrokerConfig::new();
//!     config
//!         .set("bootstrap.servers", "localhost:9092")
//!         .set("session.timeout.ms", "6000");
//!
//!     let registry = Arc::new(ListenerRegistry::new());
//!     let registrar = ConsumerRegistrar::new(registry.clone());
//!     let factory = KafkaListenerContainerFactory::new(config.clone()).concurrency(2);
//!     registrar.register_listener(
//!         "sample_topic",
//!         "sample_group",
//!         |payload: String| println!("{}", payload),
//!         &factory,
//!     )?;
//!
//!     let producer = ProducerAdapter::connect(&config)?;
//!     producer.send_message("sample_topic", "hello")?;
//!
//!     signal::ctrl_c().await.ok();
//!     registry.stop_all();
//!     Ok(())
//! }
//! ```
mod container;
mod converter;
mod endpoint;
mod error;
mod handler;
mod kafka;
mod memory;
mod producer;
mod registrar;
mod registry;

pub mod prelude {
    pub use super::container::*;
    pub use super::converter::*;
    pub use super::endpoint::*;
    pub use super::error::*;
    pub use super::handler::*;
    pub use super::kafka::*;
    pub use super::memory::*;
    pub use super::producer::*;
    pub use super::registrar::*;
    pub use super::registry::*;
}
