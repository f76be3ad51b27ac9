use crate::container::IListenerContainerFactory;
use crate::converter::ConverterFactory;
use crate::endpoint::ListenerEndpoint;
use crate::error::Error;
use crate::handler::IMessageHandler;
use crate::registry::ListenerRegistry;
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

/// Registers listeners against a running registry at any point in the
/// process lifetime.
///
/// The registrar is constructed over the registry and a converter factory
/// and never reconfigured. Each registration call builds a fresh endpoint
/// from a topic, a consumer group id and a callback, attaches a converter,
/// and submits it together with the caller's container factory. The returned
/// id addresses the listener for later deregistration.
pub struct ConsumerRegistrar {
    registry: Arc<ListenerRegistry>,
    converters: ConverterFactory,
}

impl ConsumerRegistrar {
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self {
            registry,
            converters: ConverterFactory::new(),
        }
    }

    /// Replaces the converter attached to every endpoint this registrar
    /// builds.
    pub fn converter_factory(mut self, converters: ConverterFactory) -> Self {
        self.converters = converters;
        self
    }

    pub fn register_listener<H>(
        &self,
        topic: &str,
        group_id: &str,
        handler: H,
        factory: &dyn IListenerContainerFactory,
    ) -> Result<Uuid, Error>
    where
        H: IMessageHandler,
    {
        let endpoint = ListenerEndpoint::builder()
            .topic(topic)
            .group_id(group_id)
            .converter(self.converters.create())
            .handler(handler)
            .build();
        self.registry.register_listener_container(endpoint, factory)
    }

    /// Registers a listener over every topic matching `pattern`, including
    /// topics created after registration.
    pub fn register_pattern_listener<H>(
        &self,
        pattern: Regex,
        group_id: &str,
        handler: H,
        factory: &dyn IListenerContainerFactory,
    ) -> Result<Uuid, Error>
    where
        H: IMessageHandler,
    {
        let endpoint = ListenerEndpoint::builder()
            .topic_pattern(pattern)
            .group_id(group_id)
            .converter(self.converters.create())
            .handler(handler)
            .build();
        self.registry.register_listener_container(endpoint, factory)
    }

    pub fn deregister_listener(&self, id: Uuid) -> bool {
        self.registry.deregister(id)
    }

    pub fn registry(&self) -> Arc<ListenerRegistry> {
        self.registry.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{IStreamConsumer, MessageStream};
    use crate::converter::JsonMessageConverter;
    use tokio::sync::mpsc;

    struct IdleConsumer;

    impl IStreamConsumer for IdleConsumer {
        fn subscribe(&self, _topics: &[String], _pattern: Option<&Regex>) -> Result<(), Error> {
            Ok(())
        }

        fn stream(&self) -> MessageStream {
            let (_tx, rx) = mpsc::channel(1);
            MessageStream::new(rx)
        }
    }

    struct IdleFactory;

    impl IListenerContainerFactory for IdleFactory {
        fn create_consumers(
            &self,
            _endpoint: &ListenerEndpoint,
        ) -> Result<Vec<Box<dyn IStreamConsumer>>, Error> {
            Ok(vec![Box::new(IdleConsumer)])
        }
    }

    fn registrar() -> ConsumerRegistrar {
        ConsumerRegistrar::new(Arc::new(ListenerRegistry::new()))
    }

    #[tokio::test]
    async fn repeated_registrations_stay_distinct() {
        let registrar = registrar();
        let first = registrar
            .register_listener("orders", "billing", |_: String| {}, &IdleFactory)
            .unwrap();
        let second = registrar
            .register_listener("orders", "billing", |_: String| {}, &IdleFactory)
            .unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn deregistration_goes_through_the_registry() {
        let registrar = registrar();
        let id = registrar
            .register_listener("orders", "billing", |_: String| {}, &IdleFactory)
            .unwrap();
        assert!(registrar.deregister_listener(id));
        assert!(!registrar.registry().is_registered(id));
    }

    #[tokio::test]
    async fn swapped_converter_factory_applies_to_new_endpoints() {
        let registrar = registrar().converter_factory(ConverterFactory::with_converter(Arc::new(
            JsonMessageConverter,
        )));
        assert!(registrar
            .register_listener("orders", "billing", |_: String| {}, &IdleFactory)
            .is_ok());
    }
}
