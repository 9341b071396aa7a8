use serde_json::{json, Value};

use crate::domain::entities::{Credentials, RequestPayload};
use crate::domain::error::PayPalError;
use crate::infrastructure::config::API_VERSION;

/// Turns a method identifier and caller parameters into the outbound payload.
pub trait PayloadBuilder: Send + Sync {
    fn build(&self, method: &str, params: &RequestPayload) -> Result<RequestPayload, PayPalError>;
}

fn require_method(method: &str) -> Result<(), PayPalError> {
    if method.trim().is_empty() {
        return Err(PayPalError::Payload("api method must not be empty".to_string()));
    }
    Ok(())
}

/// NVP payload: caller parameters plus credentials, `VERSION` and `METHOD`.
#[derive(Debug, Clone)]
pub struct NvpPayloadBuilder {
    credentials: Credentials,
}

impl NvpPayloadBuilder {
    pub fn new(credentials: Credentials) -> Self {
        NvpPayloadBuilder { credentials }
    }
}

impl PayloadBuilder for NvpPayloadBuilder {
    fn build(&self, method: &str, params: &RequestPayload) -> Result<RequestPayload, PayPalError> {
        require_method(method)?;
        let mut payload = params.clone();
        payload.insert("USER".into(), Value::String(self.credentials.username.clone()));
        payload.insert("PWD".into(), Value::String(self.credentials.password.clone()));
        if let Some(signature) = &self.credentials.signature {
            payload.insert("SIGNATURE".into(), Value::String(signature.clone()));
        }
        if let Some(subject) = &self.credentials.subject {
            payload.insert("SUBJECT".into(), Value::String(subject.clone()));
        }
        payload.insert("VERSION".into(), Value::String(API_VERSION.to_string()));
        payload.insert("METHOD".into(), Value::String(method.to_string()));
        Ok(payload)
    }
}

/// Adaptive Payments payload. Credentials travel in headers, so only the
/// request envelope is added.
#[derive(Debug, Clone, Default)]
pub struct JsonPayloadBuilder;

impl PayloadBuilder for JsonPayloadBuilder {
    fn build(&self, method: &str, params: &RequestPayload) -> Result<RequestPayload, PayPalError> {
        require_method(method)?;
        let mut payload = params.clone();
        payload
            .entry("requestEnvelope")
            .or_insert_with(|| json!({"errorLanguage": "en_US", "detailLevel": "ReturnAll"}));
        Ok(payload)
    }
}
