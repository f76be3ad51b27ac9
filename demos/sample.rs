use msgbridge::prelude::*;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut config = BrokerConfig::new();
    config
        .set("bootstrap.servers", "localhost:9092")
        .set("session.timeout.ms", "6000")
        .set("auto.offset.reset", "earliest");

    let registry = Arc::new(ListenerRegistry::new());
    let registrar = ConsumerRegistrar::new(registry.clone());
    let factory = KafkaListenerContainerFactory::new(config.clone()).concurrency(2);
    registrar.register_listener(
        "sample_topic",
        "sample_group",
        |payload: String| println!("received: {}", payload),
        &factory,
    )?;

    let producer = ProducerAdapter::connect(&config)?;
    for n in 0..5 {
        producer.send_message("sample_topic", &format!("sample_message: {}", n))?;
    }

    signal::ctrl_c().await.ok();
    registry.stop_all();
    Ok(())
}
