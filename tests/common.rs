use msgbridge::prelude::*;
use std::sync::Arc;

pub struct MemoryHarness {
    pub broker: InMemoryBroker,
    pub registry: Arc<ListenerRegistry>,
    pub registrar: ConsumerRegistrar,
    pub factory: MemoryListenerContainerFactory,
}

pub fn create_memory_harness() -> MemoryHarness {
    let broker = InMemoryBroker::new();
    let registry = Arc::new(ListenerRegistry::new());
    let registrar = ConsumerRegistrar::new(registry.clone());
    let factory = MemoryListenerContainerFactory::new(broker.clone());
    MemoryHarness {
        broker,
        registry,
        registrar,
        factory,
    }
}

pub fn create_memory_producer(broker: &InMemoryBroker) -> ProducerAdapter {
    ProducerAdapter::new(Arc::new(MemorySender::new(broker.clone())))
}

pub fn create_kafka_config() -> BrokerConfig {
    let mut config = BrokerConfig::new();
    config
        .set("bootstrap.servers", "localhost:9092")
        .set("session.timeout.ms", "6000")
        .set("auto.offset.reset", "earliest");
    config
}
