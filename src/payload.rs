use serde::Serialize;
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::LoggerError;
use crate::record::LogMessage;

/// Content type set on every published message.
pub const CONTENT_TYPE: &str = "application/json";

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, LoggerError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(LoggerError::Serialize(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

/// Overlay `top` onto `base`: keys in `top` win, keys unique to either
/// side are kept.
pub fn merge_objects(mut base: Map<String, Value>, top: Map<String, Value>) -> Map<String, Value> {
    base.extend(top);
    base
}

/// Merge the record over the envelope into one flat JSON object.
pub fn merge_payload(
    envelope: &Envelope,
    record: &LogMessage,
) -> Result<Map<String, Value>, LoggerError> {
    Ok(merge_objects(to_object(envelope)?, to_object(record)?))
}

/// Merge and encode the final document published to the queue.
pub fn encode(envelope: &Envelope, record: &LogMessage) -> Result<Vec<u8>, LoggerError> {
    let payload = merge_payload(envelope, record)?;
    Ok(serde_json::to_vec(&payload)?)
}
