//! The chat log format stored inside the shared variable.
//!
//! The variable's `value` is a JSON *string* whose content is a JSON array of
//! messages, in insertion order. Both encodings round-trip exactly; a null or
//! absent value reads as the empty log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

pub const MESSAGE_MAX_CHARS: usize = 64;
pub const USERNAME_MAX_CHARS: usize = 16;

/// One chat message. Insertion order is display order; messages are never
/// edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub user: String,
    /// Unix timestamp in milliseconds, taken when the message was sent.
    pub time: i64,
}

/// Reads the message list out of a variable value.
pub fn decode_log(value: Option<&Value>) -> Result<Vec<ChatMessage>, ChatError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(encoded)) => {
            serde_json::from_str(encoded).map_err(|error| ChatError::MalformedLog(error.to_string()))
        }
        Some(other) => Err(ChatError::MalformedLog(format!(
            "expected a string value, got {other}"
        ))),
    }
}

/// Encodes the message list back into a variable value.
pub fn encode_log(messages: &[ChatMessage]) -> Result<Value, ChatError> {
    let encoded = serde_json::to_string(messages)
        .map_err(|error| ChatError::MalformedLog(error.to_string()))?;
    Ok(Value::String(encoded))
}

pub(crate) fn validate_username(username: &str) -> Result<(), ChatError> {
    if username.is_empty() {
        return Err(ChatError::EmptyUsername);
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(ChatError::UsernameTooLong);
    }
    Ok(())
}

pub(crate) fn validate_message(message: &str) -> Result<(), ChatError> {
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return Err(ChatError::MessageTooLong);
    }
    Ok(())
}
