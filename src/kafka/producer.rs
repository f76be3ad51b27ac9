use crate::error::Error;
use crate::kafka::config::BrokerConfig;
use crate::producer::IMessageSender;
use log::debug;
use rdkafka::producer::{FutureProducer, FutureRecord};

/// Fire-and-forget Kafka publisher.
///
/// Hands each record to the client's send buffer and drops the delivery
/// future. Synchronous enqueue failures surface to the caller; asynchronous
/// delivery reports do not.
pub struct KafkaSender {
    producer: FutureProducer,
}

impl KafkaSender {
    pub fn new(config: &BrokerConfig) -> Result<Self, Error> {
        Ok(Self {
            producer: config.create_producer()?,
        })
    }
}

impl IMessageSender for KafkaSender {
    fn send(&self, topic: &str, message: &str) -> Result<(), Error> {
        let record = FutureRecord::<(), str>::to(topic).payload(message);
        match self.producer.send_result(record) {
            Ok(delivery) => {
                drop(delivery);
                debug!("Enqueued message.(topic={})", topic);
                Ok(())
            }
            Err((e, _)) => Err(Error::Kafka(e)),
        }
    }
}
