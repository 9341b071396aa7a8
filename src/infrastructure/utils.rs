use bytes::Bytes;
use serde_json::{Map, Value};
use std::error::Error;
use url::form_urlencoded;

use crate::domain::entities::RequestPayload;
use crate::domain::error::PayPalError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Request body ready for the wire, kept around so failures can quote it.
#[derive(Debug, Clone)]
pub struct EncodedBody {
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl EncodedBody {
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

fn form_value(key: &str, value: &Value) -> Result<String, PayPalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(PayPalError::Payload(format!(
            "field '{}' is not a scalar and cannot be form encoded",
            key
        ))),
    }
}

/// Form-encodes `pairs` first, then the payload, in order.
pub fn encode_form(leading: &[(&str, &str)], payload: &RequestPayload) -> Result<EncodedBody, PayPalError> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in leading {
        serializer.append_pair(key, value);
    }
    for (key, value) in payload {
        serializer.append_pair(key, &form_value(key, value)?);
    }
    Ok(EncodedBody {
        content_type: FORM_CONTENT_TYPE,
        bytes: Bytes::from(serializer.finish()),
    })
}

pub fn encode_json(payload: &RequestPayload) -> Result<EncodedBody, PayPalError> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|e| PayPalError::Payload(format!("unable to serialize payload: {}", e)))?;
    Ok(EncodedBody {
        content_type: JSON_CONTENT_TYPE,
        bytes: Bytes::from(bytes),
    })
}

/// Decodes an NVP response (`ACK=Success&TOKEN=...`) into a JSON object.
/// Repeated keys keep the last value.
pub fn decode_nvp(body: &[u8]) -> Map<String, Value> {
    form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

/// Flattens an error's `source()` chain, one cause per line.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut lines = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(cause.to_string());
        current = cause.source();
    }
    lines.join("\n")
}
