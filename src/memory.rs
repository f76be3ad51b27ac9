use crate::container::{IListenerContainerFactory, IStreamConsumer, MessageStream};
use crate::endpoint::ListenerEndpoint;
use crate::error::Error;
use crate::kafka::WireMessage;
use crate::producer::IMessageSender;
use log::debug;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

const CHANNEL_CAPACITY: usize = 256;
const DEFAULT_BUFFER_SIZE: usize = 64;

/// Broker stand-in that fans records out to every subscribed consumer.
///
/// Topics come to life on first use and records published while nobody is
/// subscribed are dropped. There are no partitions and no consumer groups:
/// every subscription sees every record of its topics, which gives the
/// listener layer the same fan-out a set of single-member groups would get
/// from the real middleware. Meant for tests and broker-less local runs.
#[derive(Clone)]
pub struct InMemoryBroker {
    core: Arc<BrokerCore>,
}

struct BrokerCore {
    topics: Mutex<HashMap<String, TopicCore>>,
    // Carries every record of every topic; pattern subscriptions drink from
    // this so topics created later are still covered.
    firehose: broadcast::Sender<WireMessage>,
}

struct TopicCore {
    channel: broadcast::Sender<WireMessage>,
    next_offset: i64,
}

impl TopicCore {
    fn new() -> Self {
        let (channel, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            channel,
            next_offset: 0,
        }
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        let (firehose, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            core: Arc::new(BrokerCore {
                topics: Mutex::new(HashMap::new()),
                firehose,
            }),
        }
    }

    /// Appends one record to `topic`, creating the topic if needed.
    pub fn publish(&self, topic: &str, payload: &str) {
        let message = {
            let mut topics = self.core.topics.lock().unwrap();
            let entry = topics
                .entry(topic.to_string())
                .or_insert_with(TopicCore::new);
            let message = WireMessage::from_parts(
                topic,
                0,
                entry.next_offset,
                Some(payload.as_bytes().to_vec()),
            );
            entry.next_offset += 1;
            let _ = entry.channel.send(message.clone());
            message
        };
        let _ = self.core.firehose.send(message);
    }

    fn subscribe_topic(&self, topic: &str) -> broadcast::Receiver<WireMessage> {
        self.core
            .topics
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_insert_with(TopicCore::new)
            .channel
            .subscribe()
    }

    fn subscribe_all(&self) -> broadcast::Receiver<WireMessage> {
        self.core.firehose.subscribe()
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscription {
    receivers: Vec<broadcast::Receiver<WireMessage>>,
    pattern_feed: Option<PatternFeed>,
}

struct PatternFeed {
    receiver: broadcast::Receiver<WireMessage>,
    pattern: Regex,
    // Topics already covered by a literal subscription; the pattern feed
    // skips them so overlapping subjects deliver once.
    covered: HashSet<String>,
}

pub(crate) struct MemoryStreamConsumer {
    broker: InMemoryBroker,
    subscription: Mutex<Option<Subscription>>,
    buffer_size: usize,
}

impl MemoryStreamConsumer {
    pub(crate) fn new(broker: InMemoryBroker, buffer_size: usize) -> Self {
        Self {
            broker,
            subscription: Mutex::new(None),
            buffer_size,
        }
    }
}

impl IStreamConsumer for MemoryStreamConsumer {
    /// Binds the broadcast receivers synchronously, so records published
    /// after `subscribe` returns are never missed.
    fn subscribe(&self, topics: &[String], pattern: Option<&Regex>) -> Result<(), Error> {
        let receivers = topics
            .iter()
            .map(|topic| self.broker.subscribe_topic(topic))
            .collect::<Vec<_>>();
        let pattern_feed = pattern.map(|pattern| PatternFeed {
            receiver: self.broker.subscribe_all(),
            pattern: pattern.clone(),
            covered: topics.iter().cloned().collect(),
        });
        *self.subscription.lock().unwrap() = Some(Subscription {
            receivers,
            pattern_feed,
        });
        Ok(())
    }

    fn stream(&self) -> MessageStream {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let subscription = self.subscription.lock().unwrap().take();
        if let Some(subscription) = subscription {
            for receiver in subscription.receivers {
                tokio::spawn(forward(receiver, tx.clone(), None));
            }
            if let Some(feed) = subscription.pattern_feed {
                tokio::spawn(forward(
                    feed.receiver,
                    tx.clone(),
                    Some((feed.pattern, feed.covered)),
                ));
            }
        }
        MessageStream::new(rx)
    }
}

async fn forward(
    mut receiver: broadcast::Receiver<WireMessage>,
    tx: mpsc::Sender<Result<WireMessage, Error>>,
    filter: Option<(Regex, HashSet<String>)>,
) {
    loop {
        match receiver.recv().await {
            Ok(message) => {
                if let Some((pattern, covered)) = &filter {
                    if covered.contains(message.topic()) || !pattern.is_match(message.topic()) {
                        continue;
                    }
                }
                if tx.send(Ok(message)).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(count)) => {
                debug!("Dropped lagging records.(count={})", count);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Produces in-memory consumers for listener endpoints.
pub struct MemoryListenerContainerFactory {
    broker: InMemoryBroker,
    buffer_size: usize,
}

impl MemoryListenerContainerFactory {
    pub fn new(broker: InMemoryBroker) -> Self {
        Self {
            broker,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }
}

impl IListenerContainerFactory for MemoryListenerContainerFactory {
    fn create_consumers(
        &self,
        _endpoint: &ListenerEndpoint,
    ) -> Result<Vec<Box<dyn IStreamConsumer>>, Error> {
        // Exactly one consumer per endpoint: the broker fans out per
        // subscription, so a second consumer would see every record again.
        Ok(vec![Box::new(MemoryStreamConsumer::new(
            self.broker.clone(),
            self.buffer_size,
        ))])
    }
}

/// Publisher half of the in-memory middleware.
pub struct MemorySender {
    broker: InMemoryBroker,
}

impl MemorySender {
    pub fn new(broker: InMemoryBroker) -> Self {
        Self { broker }
    }
}

impl IMessageSender for MemorySender {
    fn send(&self, topic: &str, message: &str) -> Result<(), Error> {
        self.broker.publish(topic, message);
        Ok(())
    }
}
