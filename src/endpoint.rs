use crate::converter::{IMessageConverter, StringMessageConverter};
use crate::error::Error;
use crate::handler::{DynamicMessageHandler, IMessageHandler};
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

/// Descriptor of one registered listener: a freshly generated id, the target
/// topics and/or a topic pattern, the consumer group id, and the bound
/// callback and converter.
///
/// Every [`ListenerEndpointBuilder::build`] call generates a new id, so two
/// registrations never collide even for the same topic/group pair. The
/// endpoint itself is inert; the listener registry turns it into a running
/// container and owns it from then on.
pub struct ListenerEndpoint {
    id: Uuid,
    topics: Vec<String>,
    topic_pattern: Option<Regex>,
    group_id: String,
    handler: Option<Arc<dyn IMessageHandler>>,
    converter: Option<Arc<dyn IMessageConverter>>,
}

impl ListenerEndpoint {
    pub fn builder() -> ListenerEndpointBuilder {
        ListenerEndpointBuilder::new()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topic_pattern(&self) -> Option<&Regex> {
        self.topic_pattern.as_ref()
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Produces the invoker the container will dispatch to. Fails when no
    /// handler was attached; an absent converter falls back to plain text.
    pub(crate) fn bind(&self) -> Result<DynamicMessageHandler, Error> {
        let handler = self
            .handler
            .clone()
            .ok_or(Error::HandlerBinding(self.id))?;
        let converter = self
            .converter
            .clone()
            .unwrap_or_else(|| Arc::new(StringMessageConverter));
        Ok(DynamicMessageHandler::new(handler, converter))
    }
}

pub struct ListenerEndpointBuilder {
    topics: Vec<String>,
    topic_pattern: Option<Regex>,
    group_id: String,
    handler: Option<Arc<dyn IMessageHandler>>,
    converter: Option<Arc<dyn IMessageConverter>>,
}

impl ListenerEndpointBuilder {
    fn new() -> Self {
        Self {
            topics: vec![],
            topic_pattern: None,
            group_id: String::new(),
            handler: None,
            converter: None,
        }
    }

    pub fn topic<T>(mut self, topic: T) -> Self
    where
        T: Into<String>,
    {
        self.topics.push(topic.into());
        self
    }

    pub fn topics(mut self, topics: &[&str]) -> Self {
        self.topics
            .extend(topics.iter().map(|t| t.to_string()));
        self
    }

    /// Subscribes the endpoint to every topic matching `pattern` instead of
    /// (or in addition to) literal topic names.
    pub fn topic_pattern(mut self, pattern: Regex) -> Self {
        self.topic_pattern = Some(pattern);
        self
    }

    pub fn group_id<G>(mut self, group_id: G) -> Self
    where
        G: Into<String>,
    {
        self.group_id = group_id.into();
        self
    }

    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: IMessageHandler,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn converter(mut self, converter: Arc<dyn IMessageConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Builds the endpoint, generating its process-unique id.
    pub fn build(self) -> ListenerEndpoint {
        ListenerEndpoint {
            id: Uuid::new_v4(),
            topics: self.topics,
            topic_pattern: self.topic_pattern,
            group_id: self.group_id,
            handler: self.handler,
            converter: self.converter,
        }
    }
}

impl Default for ListenerEndpointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_build_generates_a_fresh_id() {
        let first = ListenerEndpoint::builder()
            .topic("orders")
            .group_id("billing")
            .build();
        let second = ListenerEndpoint::builder()
            .topic("orders")
            .group_id("billing")
            .build();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn bind_without_handler_is_a_binding_defect() {
        let endpoint = ListenerEndpoint::builder()
            .topic("orders")
            .group_id("billing")
            .build();
        match endpoint.bind() {
            Err(Error::HandlerBinding(id)) => assert_eq!(id, endpoint.id()),
            other => panic!("expected HandlerBinding, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bind_defaults_to_the_text_converter() {
        let endpoint = ListenerEndpoint::builder()
            .topic("orders")
            .group_id("billing")
            .handler(|_: String| {})
            .build();
        let invoker = endpoint.bind().unwrap();
        let message = crate::kafka::WireMessage::from_parts("orders", 0, 0, Some(b"ok".to_vec()));
        assert!(invoker.invoke(&message).is_ok());
    }
}
