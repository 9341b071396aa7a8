use serde_json::Value;

use crate::domain::error::PayPalError;
use crate::infrastructure::decode_nvp;

/// Turns a raw response body into the structured success value.
pub trait ResponseExtractor: Send + Sync {
    fn extract(&self, method: &str, body: &[u8]) -> Result<Value, PayPalError>;
}

#[derive(Debug, Clone, Default)]
pub struct NvpExtractor;

impl ResponseExtractor for NvpExtractor {
    fn extract(&self, _method: &str, body: &[u8]) -> Result<Value, PayPalError> {
        Ok(Value::Object(decode_nvp(body)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonExtractor;

impl ResponseExtractor for JsonExtractor {
    fn extract(&self, method: &str, body: &[u8]) -> Result<Value, PayPalError> {
        serde_json::from_slice(body).map_err(|e| PayPalError::Extraction {
            message: format!("{} returned a body that is not valid JSON", method),
            source: Some(Box::new(e)),
        })
    }
}

/// Body as a JSON string; used for IPN validation (`VERIFIED` / `INVALID`).
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl ResponseExtractor for TextExtractor {
    fn extract(&self, method: &str, body: &[u8]) -> Result<Value, PayPalError> {
        let text = std::str::from_utf8(body).map_err(|e| PayPalError::Extraction {
            message: format!("{} returned a body that is not UTF-8", method),
            source: Some(Box::new(e)),
        })?;
        Ok(Value::String(text.trim().to_string()))
    }
}
