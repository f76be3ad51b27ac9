use rdkafka::message::{Message as IMessage, OwnedMessage};
use rdkafka::Timestamp;

/// One record as read from the middleware, detached from any consumer buffer.
#[derive(Clone, Debug)]
pub struct WireMessage {
    base: OwnedMessage,
}

impl WireMessage {
    pub(crate) fn new(base: OwnedMessage) -> Self {
        Self { base }
    }

    pub(crate) fn from_parts(
        topic: &str,
        partition: i32,
        offset: i64,
        payload: Option<Vec<u8>>,
    ) -> Self {
        Self::new(OwnedMessage::new(
            payload,
            None,
            topic.to_string(),
            Timestamp::NotAvailable,
            partition,
            offset,
            None,
        ))
    }

    pub fn topic(&self) -> &str {
        self.base.topic()
    }

    pub fn partition(&self) -> i32 {
        self.base.partition()
    }

    pub fn offset(&self) -> i64 {
        self.base.offset()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.base.payload()
    }
}
