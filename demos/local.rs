use msgbridge::prelude::*;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let broker = InMemoryBroker::new();
    let registry = Arc::new(ListenerRegistry::new());
    let registrar = ConsumerRegistrar::new(registry.clone());
    let factory = MemoryListenerContainerFactory::new(broker.clone());

    registrar.register_listener(
        "greetings",
        "printers",
        |payload: String| println!("printer: {}", payload),
        &factory,
    )?;
    registrar.register_listener(
        "greetings",
        "counters",
        |payload: String| println!("counter: {} bytes", payload.len()),
        &factory,
    )?;

    let producer = ProducerAdapter::new(Arc::new(MemorySender::new(broker.clone())));
    producer.send_message("greetings", "hello")?;
    producer.send_message("greetings", "goodbye")?;

    sleep(Duration::from_millis(100)).await;
    registry.stop_all();
    Ok(())
}
