use crate::endpoint::ListenerEndpoint;
use crate::error::Error;
use crate::handler::DynamicMessageHandler;
use crate::kafka::WireMessage;
use log::{debug, error, warn};
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

/// Feed of records produced by one middleware consumer.
///
/// Backed by a bounded channel that the consumer's forwarding task fills;
/// dropping the stream tears that task down. Middleware errors travel through
/// the stream as items so the listening side decides how to react.
pub struct MessageStream {
    receiver: mpsc::Receiver<Result<WireMessage, Error>>,
}

impl MessageStream {
    pub(crate) fn new(receiver: mpsc::Receiver<Result<WireMessage, Error>>) -> Self {
        Self { receiver }
    }
}

impl Stream for MessageStream {
    type Item = Result<WireMessage, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// One subscribed consumer of the underlying middleware.
///
/// `subscribe` binds the consumer to literal topics and/or a topic pattern;
/// `stream` hands back the record feed.
pub trait IStreamConsumer: 'static + Send + Sync {
    fn subscribe(&self, topics: &[String], pattern: Option<&Regex>) -> Result<(), Error>;
    fn stream(&self) -> MessageStream;
}

/// Creates the middleware consumers backing one listener container.
///
/// A factory may hand back several consumers for a single endpoint; each one
/// gets its own listening task inside the container.
pub trait IListenerContainerFactory: Send + Sync {
    fn create_consumers(
        &self,
        endpoint: &ListenerEndpoint,
    ) -> Result<Vec<Box<dyn IStreamConsumer>>, Error>;
}

/// Running home of one registered listener endpoint.
///
/// Owns the endpoint and a stop signal for its listening tasks. Records flow
/// from the consumer streams into the bound handler; a record that fails
/// conversion is logged and skipped, and a panicking handler loses only the
/// record it was given. Dropping the container stops every task.
pub struct MessageListenerContainer {
    endpoint: ListenerEndpoint,
    stop: watch::Sender<bool>,
}

impl MessageListenerContainer {
    pub(crate) fn launch(
        endpoint: ListenerEndpoint,
        invoker: DynamicMessageHandler,
        consumers: Vec<Box<dyn IStreamConsumer>>,
    ) -> Result<Self, Error> {
        let (stop, _) = watch::channel(false);
        for consumer in consumers {
            consumer.subscribe(endpoint.topics(), endpoint.topic_pattern())?;
            let stream = consumer.stream();
            let invoker = invoker.clone();
            let signal = stop.subscribe();
            let id = endpoint.id();
            tokio::spawn(Self::listen(stream, invoker, signal, id));
        }
        Ok(Self { endpoint, stop })
    }

    async fn listen(
        mut stream: MessageStream,
        invoker: DynamicMessageHandler,
        mut signal: watch::Receiver<bool>,
        id: Uuid,
    ) {
        loop {
            tokio::select! {
                received = stream.next() => {
                    match received {
                        Some(Ok(message)) => Self::dispatch(&invoker, &message, id),
                        Some(Err(e)) => {
                            error!("Middleware error occurred.(listener={}, error={})", id, e);
                        }
                        None => break,
                    }
                }
                changed = signal.changed() => {
                    if changed.is_err() || *signal.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Listener stopped.(id={})", id);
    }

    fn dispatch(invoker: &DynamicMessageHandler, message: &WireMessage, id: Uuid) {
        match panic::catch_unwind(AssertUnwindSafe(|| invoker.invoke(message))) {
            Ok(Ok(())) => (),
            Ok(Err(e)) => {
                warn!(
                    "Skipped unconvertible message.(listener={}, topic={}, reason={})",
                    id,
                    message.topic(),
                    e
                );
            }
            Err(_) => {
                error!(
                    "Handler panicked.(listener={}, topic={})",
                    id,
                    message.topic()
                );
            }
        }
    }

    pub fn id(&self) -> Uuid {
        self.endpoint.id()
    }

    pub fn endpoint(&self) -> &ListenerEndpoint {
        &self.endpoint
    }

    /// Signals every listening task of this container to stop.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

impl Drop for MessageListenerContainer {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ListenerEndpoint;
    use rdkafka::error::KafkaError;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    const MOCK_BUFFER_SIZE: usize = 16;

    struct ScriptedConsumer {
        items: Mutex<Vec<Result<WireMessage, Error>>>,
    }

    impl ScriptedConsumer {
        fn new(items: Vec<Result<WireMessage, Error>>) -> Self {
            Self {
                items: Mutex::new(items),
            }
        }
    }

    impl IStreamConsumer for ScriptedConsumer {
        fn subscribe(&self, _topics: &[String], _pattern: Option<&Regex>) -> Result<(), Error> {
            Ok(())
        }

        fn stream(&self) -> MessageStream {
            let (tx, rx) = mpsc::channel(MOCK_BUFFER_SIZE);
            let items = std::mem::take(&mut *self.items.lock().unwrap());
            tokio::spawn(async move {
                for item in items {
                    let _ = tx.send(item).await;
                }
            });
            MessageStream::new(rx)
        }
    }

    fn record(payload: &str) -> Result<WireMessage, Error> {
        Ok(WireMessage::from_parts(
            "orders",
            0,
            0,
            Some(payload.as_bytes().to_vec()),
        ))
    }

    fn launch_with(
        handler: impl Fn(String) + Send + Sync + 'static,
        items: Vec<Result<WireMessage, Error>>,
    ) -> MessageListenerContainer {
        let endpoint = ListenerEndpoint::builder()
            .topic("orders")
            .group_id("billing")
            .handler(handler)
            .build();
        let invoker = endpoint.bind().unwrap();
        let consumer = Box::new(ScriptedConsumer::new(items));
        MessageListenerContainer::launch(endpoint, invoker, vec![consumer]).unwrap()
    }

    #[tokio::test]
    async fn records_reach_the_bound_handler() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let _container = launch_with(
            move |payload: String| {
                let _ = seen_tx.send(payload);
            },
            vec![record("first"), record("second")],
        );

        let first = timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        let second = timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(second.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn panicking_handler_loses_only_its_record() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let _container = launch_with(
            move |payload: String| {
                if payload == "poison" {
                    panic!("refused");
                }
                let _ = seen_tx.send(payload);
            },
            vec![record("poison"), record("healthy")],
        );

        let survivor = timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        assert_eq!(survivor.as_deref(), Some("healthy"));
    }

    #[tokio::test]
    async fn middleware_errors_do_not_stop_the_listener() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let _container = launch_with(
            move |payload: String| {
                let _ = seen_tx.send(payload);
            },
            vec![
                Err(Error::Kafka(KafkaError::PartitionEOF(0))),
                record("after-error"),
            ],
        );

        let survivor = timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        assert_eq!(survivor.as_deref(), Some("after-error"));
    }

    #[tokio::test]
    async fn stop_ends_the_listening_task() {
        let container = launch_with(|_: String| {}, vec![]);
        container.stop();
        // Yields so the listening task observes the signal before the test ends.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
