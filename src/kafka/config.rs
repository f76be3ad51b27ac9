use rdkafka::config::FromClientConfig;
use rdkafka::consumer::stream_consumer::StreamConsumer;
use rdkafka::error::KafkaResult;
use rdkafka::producer::FutureProducer;
use rdkafka::ClientConfig;

/// Connection settings shared by every consumer and producer of one broker.
///
/// Thin wrapper over the librdkafka property map. The consumer group id and
/// commit policy are applied at creation time, so a single config can back
/// any number of listener endpoints.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    base_config: ClientConfig,
}

impl BrokerConfig {
    pub fn new() -> BrokerConfig {
        BrokerConfig {
            base_config: ClientConfig::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V) -> &mut BrokerConfig
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.base_config.set(key.into(), value.into());
        self
    }

    pub(crate) fn create_consumer(&self, group_id: &str) -> KafkaResult<StreamConsumer> {
        let mut config = self.base_config.clone();
        config.set("group.id", group_id);
        config.set("enable.auto.commit", "true");
        StreamConsumer::from_config(&config)
    }

    pub(crate) fn create_producer(&self) -> KafkaResult<FutureProducer> {
        FutureProducer::from_config(&self.base_config)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new()
    }
}
