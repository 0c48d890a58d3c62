use serde_json::Value;

use crate::error::{PayloadError, RecordError};

/// One message as received from the endpoint.
///
/// Either field may be absent; a record with neither is rejected by
/// [`Message::from_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub username: Option<String>,
    pub message: Option<String>,
}

pub type Messages = Vec<Message>;

impl Message {
    pub fn new(username: &str, message: &str) -> Message {
        Message {
            username: Some(username.to_string()),
            message: Some(message.to_string()),
        }
    }

    pub fn from_value(value: &Value) -> Result<Message, RecordError> {
        let record = value.as_object().ok_or(RecordError::NotAnObject)?;
        let username = record.get("username").and_then(as_text);
        let message = record.get("message").and_then(as_text);
        if username.is_none() && message.is_none() {
            return Err(RecordError::MissingFields);
        }
        Ok(Message { username, message })
    }
}

// Strings pass through, scalars are stringified, everything else is absent.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug)]
pub struct SkippedRecord {
    /// Zero-based position of the record in the payload.
    pub position: usize,
    pub reason: RecordError,
}

/// The decoded response of one fetch, in response order.
#[derive(Debug, Default)]
pub struct MessageCollection {
    pub messages: Messages,
    pub skipped: Vec<SkippedRecord>,
}

impl MessageCollection {
    pub fn from_slice(body: &[u8]) -> Result<MessageCollection, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        MessageCollection::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<MessageCollection, PayloadError> {
        let records: Vec<Value> = match value {
            Value::Array(records) => records,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            Value::Null => return Err(PayloadError::NotACollection("null")),
            Value::Bool(_) => return Err(PayloadError::NotACollection("boolean")),
            Value::Number(_) => return Err(PayloadError::NotACollection("number")),
            Value::String(_) => return Err(PayloadError::NotACollection("string")),
        };

        let mut collection = MessageCollection::default();
        for (position, record) in records.iter().enumerate() {
            match Message::from_value(record) {
                Ok(message) => collection.messages.push(message),
                Err(reason) => {
                    tracing::warn!(position, %reason, "skipping malformed record");
                    collection.skipped.push(SkippedRecord { position, reason });
                }
            }
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
