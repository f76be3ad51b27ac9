use rdkafka::error::KafkaError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by listener registration and message production.
///
/// Apart from the variants below this layer adds no failure handling of its
/// own: middleware errors are passed through unchanged and never retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The endpoint cannot expose a callable handler to the registry.
    ///
    /// This is a configuration defect in the host application, not a runtime
    /// data error. It is reported once at registration time and must not be
    /// retried.
    #[error("no callable handler bound to listener endpoint {0}")]
    HandlerBinding(Uuid),
    /// The endpoint names no topic, or names an empty one.
    #[error("listener endpoint must name at least one non-empty topic")]
    EmptyTopic,
    /// The endpoint carries an empty consumer group id.
    #[error("listener endpoint must carry a non-empty consumer group id")]
    EmptyGroupId,
    /// Middleware failure, passed through unchanged.
    #[error(transparent)]
    Kafka(#[from] KafkaError),
}
