use crate::kafka::WireMessage;
use std::sync::Arc;
use thiserror::Error;

/// Failure to turn a wire message body into the handler argument.
///
/// Conversion failures never cross the registration or producer APIs; the
/// listener container logs them and skips the message.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("payload is not well-formed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Strategy translating a raw wire message into the handler's argument type.
///
/// The crate commits to plain text at this layer; implementors decide how the
/// body bytes become that text.
pub trait IMessageConverter: Send + Sync + 'static {
    fn convert(&self, message: &WireMessage) -> Result<String, ConversionError>;
}

/// Default converter: the body is UTF-8 text.
///
/// A missing payload converts to the empty string, so tombstone records still
/// reach the handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringMessageConverter;

impl IMessageConverter for StringMessageConverter {
    fn convert(&self, message: &WireMessage) -> Result<String, ConversionError> {
        match message.payload() {
            Some(bytes) => Ok(std::str::from_utf8(bytes)?.to_string()),
            None => Ok(String::new()),
        }
    }
}

/// Converter for JSON topics: checks the body is well-formed JSON and hands
/// the original text through unchanged.
///
/// Records with a missing payload fail the well-formedness check and are
/// skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMessageConverter;

impl IMessageConverter for JsonMessageConverter {
    fn convert(&self, message: &WireMessage) -> Result<String, ConversionError> {
        let text = StringMessageConverter.convert(message)?;
        serde_json::from_str::<serde::de::IgnoredAny>(&text)?;
        Ok(text)
    }
}

/// Builds the converter attached to each registered endpoint.
///
/// [`ConverterFactory::new`] yields a factory configured for plain text;
/// [`ConverterFactory::with_converter`] swaps the strategy. Pure construction,
/// stateless afterwards.
#[derive(Clone)]
pub struct ConverterFactory {
    converter: Arc<dyn IMessageConverter>,
}

impl ConverterFactory {
    pub fn new() -> Self {
        Self::with_converter(Arc::new(StringMessageConverter))
    }

    pub fn with_converter(converter: Arc<dyn IMessageConverter>) -> Self {
        Self { converter }
    }

    /// The converter for one endpoint. Converters are stateless, so every
    /// endpoint shares the configured instance.
    pub fn create(&self) -> Arc<dyn IMessageConverter> {
        Arc::clone(&self.converter)
    }
}

impl Default for ConverterFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(payload: Option<&str>) -> WireMessage {
        WireMessage::from_parts("topic", 0, 0, payload.map(|p| p.as_bytes().to_vec()))
    }

    #[test]
    fn string_converter_decodes_utf8() {
        let converted = StringMessageConverter.convert(&message(Some("hello")));
        assert_eq!(converted.unwrap(), "hello");
    }

    #[test]
    fn string_converter_maps_missing_payload_to_empty() {
        let converted = StringMessageConverter.convert(&message(None));
        assert_eq!(converted.unwrap(), "");
    }

    #[test]
    fn string_converter_rejects_invalid_utf8() {
        let message = WireMessage::from_parts("topic", 0, 0, Some(vec![0xff, 0xfe]));
        assert!(matches!(
            StringMessageConverter.convert(&message),
            Err(ConversionError::Utf8(_))
        ));
    }

    #[test]
    fn json_converter_passes_wellformed_text_through() {
        let converted = JsonMessageConverter.convert(&message(Some(r#"{"id": 1}"#)));
        assert_eq!(converted.unwrap(), r#"{"id": 1}"#);
    }

    #[test]
    fn json_converter_rejects_malformed_json() {
        assert!(matches!(
            JsonMessageConverter.convert(&message(Some("{not json"))),
            Err(ConversionError::Json(_))
        ));
    }

    #[test]
    fn factory_defaults_to_text() {
        let converter = ConverterFactory::new().create();
        let converted = converter.convert(&message(Some("plain"))).unwrap();
        assert_eq!(converted, "plain");
    }

    #[test]
    fn factory_carries_the_configured_strategy() {
        let factory = ConverterFactory::with_converter(Arc::new(JsonMessageConverter));
        assert!(factory.create().convert(&message(Some("oops"))).is_err());
    }
}
