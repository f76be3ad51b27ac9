use crate::converter::{ConversionError, IMessageConverter};
use crate::kafka::WireMessage;
use std::sync::Arc;

/// Callback invoked for every message delivered to a registered endpoint.
///
/// Implemented for any `Fn(String)` closure, so callers usually pass one
/// directly. Once the endpoint is active the middleware may invoke the
/// callback from several workers at once; implementations must tolerate
/// concurrent calls unless the container factory is configured for strict
/// single-threaded consumption.
pub trait IMessageHandler: Send + Sync + 'static {
    fn handle(&self, payload: String);
}

impl<F> IMessageHandler for F
where
    F: Fn(String) + Send + Sync + 'static,
{
    fn handle(&self, payload: String) {
        self(payload)
    }
}

/// Binds one callback to one converter; this is what a listener container
/// invokes per inbound message.
#[derive(Clone)]
pub struct DynamicMessageHandler {
    handler: Arc<dyn IMessageHandler>,
    converter: Arc<dyn IMessageConverter>,
}

impl DynamicMessageHandler {
    pub(crate) fn new(
        handler: Arc<dyn IMessageHandler>,
        converter: Arc<dyn IMessageConverter>,
    ) -> Self {
        Self { handler, converter }
    }

    /// Converts the message body and hands it to the callback.
    pub fn invoke(&self, message: &WireMessage) -> Result<(), ConversionError> {
        let payload = self.converter.convert(message)?;
        self.handler.handle(payload);
        Ok(())
    }
}
