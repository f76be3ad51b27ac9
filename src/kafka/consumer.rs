use crate::container::{IListenerContainerFactory, IStreamConsumer, MessageStream};
use crate::endpoint::ListenerEndpoint;
use crate::error::Error;
use crate::kafka::config::BrokerConfig;
use crate::kafka::message::WireMessage;
use log::debug;
use rdkafka::consumer::stream_consumer::StreamConsumer as BaseStreamConsumer;
use rdkafka::consumer::Consumer;
use regex::Regex;
use std::sync::Arc;
use tokio::sync::mpsc;

const DEFAULT_CONCURRENCY: usize = 1;
const DEFAULT_BUFFER_SIZE: usize = 64;

pub(crate) struct KafkaStreamConsumer {
    base_consumer: Arc<BaseStreamConsumer>,
    buffer_size: usize,
}

impl KafkaStreamConsumer {
    pub(crate) fn new(base_consumer: BaseStreamConsumer, buffer_size: usize) -> Self {
        Self {
            base_consumer: Arc::new(base_consumer),
            buffer_size,
        }
    }
}

impl IStreamConsumer for KafkaStreamConsumer {
    fn subscribe(&self, topics: &[String], pattern: Option<&Regex>) -> Result<(), Error> {
        let mut subjects = topics.to_vec();
        if let Some(pattern) = pattern {
            subjects.push(pattern_subject(pattern));
        }
        let refs = subjects.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        self.base_consumer.subscribe(&refs)?;
        Ok(())
    }

    fn stream(&self) -> MessageStream {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        tokio::spawn({
            let base_consumer = self.base_consumer.clone();
            async move {
                loop {
                    let item = match base_consumer.recv().await {
                        Ok(msg) => Ok(WireMessage::new(msg.detach())),
                        Err(e) => Err(Error::Kafka(e)),
                    };
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
                debug!("Stopped forwarding records.");
            }
        });
        MessageStream::new(rx)
    }
}

// Subscription strings starting with '^' are regex subscriptions in librdkafka.
fn pattern_subject(pattern: &Regex) -> String {
    let source = pattern.as_str();
    if source.starts_with('^') {
        source.to_string()
    } else {
        format!("^{}", source)
    }
}

/// Produces Kafka-backed consumers for listener endpoints.
///
/// `concurrency` controls how many consumers serve each endpoint. They all
/// join the endpoint's consumer group, so the middleware splits the topic's
/// partitions between them.
pub struct KafkaListenerContainerFactory {
    config: BrokerConfig,
    concurrency: usize,
    buffer_size: usize,
}

impl KafkaListenerContainerFactory {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            concurrency: DEFAULT_CONCURRENCY,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }
}

impl IListenerContainerFactory for KafkaListenerContainerFactory {
    fn create_consumers(
        &self,
        endpoint: &ListenerEndpoint,
    ) -> Result<Vec<Box<dyn IStreamConsumer>>, Error> {
        let mut consumers: Vec<Box<dyn IStreamConsumer>> = Vec::with_capacity(self.concurrency);
        for _ in 0..self.concurrency {
            let base_consumer = self.config.create_consumer(endpoint.group_id())?;
            consumers.push(Box::new(KafkaStreamConsumer::new(
                base_consumer,
                self.buffer_size,
            )));
        }
        Ok(consumers)
    }
}
