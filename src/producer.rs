use crate::error::Error;
use crate::kafka::{BrokerConfig, KafkaSender};
use std::sync::Arc;

/// Middleware-facing half of the producer: enqueues one payload to a topic.
pub trait IMessageSender: Send + Sync + 'static {
    fn send(&self, topic: &str, message: &str) -> Result<(), Error>;
}

/// Fire-and-forget publisher surface.
///
/// Hands each payload to the middleware sender and prints one diagnostic
/// line per hand-off. The adapter never waits for an acknowledgement and
/// never validates the topic; a synchronous enqueue failure is the only
/// error it can report.
pub struct ProducerAdapter {
    sender: Arc<dyn IMessageSender>,
}

impl ProducerAdapter {
    pub fn new(sender: Arc<dyn IMessageSender>) -> Self {
        Self { sender }
    }

    /// Builds an adapter over a Kafka sender created from `config`.
    pub fn connect(config: &BrokerConfig) -> Result<Self, Error> {
        Ok(Self::new(Arc::new(KafkaSender::new(config)?)))
    }

    /// Enqueues `message` to `topic` and reports the hand-off on standard
    /// output.
    pub fn send_message(&self, topic: &str, message: &str) -> Result<(), Error> {
        self.sender.send(topic, message)?;
        println!("Message sent: {}", message);
        Ok(())
    }
}
