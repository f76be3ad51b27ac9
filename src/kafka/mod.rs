mod config;
mod consumer;
mod message;
mod producer;

pub use config::BrokerConfig;
pub use consumer::KafkaListenerContainerFactory;
pub use message::WireMessage;
pub use producer::KafkaSender;
