use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::Message;

const KNOWN_CATEGORIES: &[&str] = &["order", "dispute", "cant_do", "rate", "dm", "restore"];

/// Decode a message, tolerating coordinator version skew: an unrecognized
/// top-level category returns `Ok(None)` instead of an error so the caller
/// can log-and-skip it (§4.F "Parsing").
pub fn parse_message(raw: &str) -> Result<Option<Message>, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    let Some(category) = value.as_object().and_then(|obj| obj.keys().next()) else {
        return Err(ProtocolError::UnknownCategory(raw.to_string()));
    };

    if !KNOWN_CATEGORIES.contains(&category.as_str()) {
        tracing::warn!(category, "skipping message with unrecognized category");
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(message) => Ok(Some(message)),
        Err(_) => {
            tracing::warn!(category, "skipping message with unrecognized action or shape");
            Ok(None)
        }
    }
}
