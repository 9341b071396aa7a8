use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::PayPalError;

/// Outbound body before encoding. Rebuilt for every request.
pub type RequestPayload = Map<String, Value>;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    Sandbox,
    Live,
}

impl FromStr for ApiMode {
    type Err = PayPalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(ApiMode::Sandbox),
            "live" => Ok(ApiMode::Live),
            other => Err(PayPalError::Config(format!("unknown mode '{}'", other))),
        }
    }
}

/// Which PayPal API family the adapter talks to. Decides body encoding,
/// response decoding and the request URL.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKind {
    /// Name-value-pair API: form encoded request and response.
    ExpressCheckout,
    /// JSON API, one URL per method under the base URL.
    AdaptivePayments,
}

impl FromStr for ApiKind {
    type Err = PayPalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "expresscheckout" | "nvp" => Ok(ApiKind::ExpressCheckout),
            "adaptivepayments" | "adaptive" => Ok(ApiKind::AdaptivePayments),
            other => Err(PayPalError::Config(format!("unknown api kind '{}'", other))),
        }
    }
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub signature: Option<String>,
    pub app_id: Option<String>,
    pub subject: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("signature", &self.signature.as_ref().map(|_| "***"))
            .field("app_id", &self.app_id)
            .field("subject", &self.subject)
            .finish()
    }
}

/// Everything `PayPalHttpClient::configure` needs. The TLS version is not a
/// field: it is always pinned to 1.2.
#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    pub kind: ApiKind,
    pub mode: ApiMode,
    pub api_url: String,
    pub notify_url: String,
    pub validate_ssl: bool,
    pub certificate: Option<PathBuf>,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfiguration {
    /// Configuration pointing at PayPal's default endpoints for `kind` and `mode`.
    pub fn for_mode(kind: ApiKind, mode: ApiMode, credentials: Credentials) -> Self {
        ClientConfiguration {
            kind,
            mode,
            api_url: crate::infrastructure::config::default_api_url(kind, mode, false).to_string(),
            notify_url: crate::infrastructure::config::default_notify_url(mode).to_string(),
            validate_ssl: true,
            certificate: None,
            credentials,
            timeout: crate::infrastructure::config::DEFAULT_TIMEOUT,
        }
    }

    /// Client certificate authentication uses a different NVP host than
    /// signature authentication; the URL follows the certificate unless it
    /// was overridden.
    pub fn with_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        if self.api_url == crate::infrastructure::config::default_api_url(self.kind, self.mode, false) {
            self.api_url =
                crate::infrastructure::config::default_api_url(self.kind, self.mode, true).to_string();
        }
        self.certificate = Some(path.into());
        self
    }
}

/// One API call: the method identifier plus its parameters.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    #[serde(default)]
    pub params: RequestPayload,
    #[serde(default)]
    pub fraudnet_id: Option<String>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>) -> Self {
        ApiRequest {
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn fraudnet_id(mut self, id: impl Into<String>) -> Self {
        self.fraudnet_id = Some(id.into());
        self
    }
}

/// Failure record handed back instead of an error.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub code: i64,
    pub trace: String,
}

impl From<&PayPalError> for ErrorResult {
    fn from(err: &PayPalError) -> Self {
        ErrorResult {
            kind: "error".to_string(),
            message: err.to_string(),
            code: err.code(),
            trace: crate::infrastructure::error_chain(err),
        }
    }
}

/// Result of `execute`: extracted data or the error record, never both.
///
/// Reading one back only yields `Error` for an object whose `type` is
/// `"error"` and which has the full record shape; anything else is `Success`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ApiResponse {
    Error(ErrorResult),
    Success(Value),
}

impl<'de> Deserialize<'de> for ApiResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.get("type").and_then(Value::as_str) == Some("error") {
            if let Ok(record) = serde_json::from_value::<ErrorResult>(value.clone()) {
                return Ok(ApiResponse::Error(record));
            }
        }
        Ok(ApiResponse::Success(value))
    }
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Error(_))
    }
}

impl From<Result<Value, PayPalError>> for ApiResponse {
    fn from(result: Result<Value, PayPalError>) -> Self {
        match result {
            Ok(value) => ApiResponse::Success(value),
            Err(err) => ApiResponse::Error(ErrorResult::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_result_serializes_with_type_field() {
        let record = ErrorResult {
            kind: "error".into(),
            message: "boom".into(),
            code: 400,
            trace: String::new(),
        };
        let value = serde_json::to_value(ApiResponse::Error(record)).unwrap();
        assert_eq!(
            value,
            json!({"type": "error", "message": "boom", "code": 400, "trace": ""})
        );
    }

    #[test]
    fn success_serializes_as_bare_value() {
        let value = serde_json::to_value(ApiResponse::Success(json!({"ACK": "Success"}))).unwrap();
        assert_eq!(value, json!({"ACK": "Success"}));
    }

    #[test]
    fn from_result_keeps_exactly_one_side() {
        let ok = ApiResponse::from(Ok::<Value, PayPalError>(json!(1)));
        assert!(!ok.is_error());

        let err = ApiResponse::from(Err::<Value, _>(PayPalError::Payload("missing".into())));
        match err {
            ApiResponse::Error(record) => {
                assert_eq!(record.kind, "error");
                assert!(record.message.contains("missing"));
            }
            ApiResponse::Success(_) => panic!("expected error record"),
        }
    }

    #[test]
    fn reads_back_error_only_when_type_is_error() {
        let record: ApiResponse = serde_json::from_value(
            json!({"type": "error", "message": "boom", "code": 400, "trace": ""}),
        )
        .unwrap();
        assert!(record.is_error());

        let lookalike = json!({"type": "refund", "message": "done", "code": 0, "trace": "t-1"});
        let parsed: ApiResponse = serde_json::from_value(lookalike.clone()).unwrap();
        assert_eq!(parsed, ApiResponse::Success(lookalike));

        let partial = json!({"type": "error", "message": "no code"});
        let parsed: ApiResponse = serde_json::from_value(partial.clone()).unwrap();
        assert_eq!(parsed, ApiResponse::Success(partial));
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials {
            username: "merchant".into(),
            password: "hunter2".into(),
            signature: Some("sig-secret".into()),
            ..Default::default()
        };
        let out = format!("{:?}", creds);
        assert!(out.contains("merchant"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("sig-secret"));
    }

    #[test]
    fn parses_mode_and_kind() {
        assert_eq!("Sandbox".parse::<ApiMode>().unwrap(), ApiMode::Sandbox);
        assert_eq!("live".parse::<ApiMode>().unwrap(), ApiMode::Live);
        assert!("staging".parse::<ApiMode>().is_err());
        assert_eq!("express_checkout".parse::<ApiKind>().unwrap(), ApiKind::ExpressCheckout);
        assert_eq!("adaptive".parse::<ApiKind>().unwrap(), ApiKind::AdaptivePayments);
    }

    #[test]
    fn certificate_switches_default_nvp_host() {
        let cfg = ClientConfiguration::for_mode(ApiKind::ExpressCheckout, ApiMode::Sandbox, Credentials::default());
        assert_eq!(cfg.api_url, "https://api-3t.sandbox.paypal.com/nvp");
        let cfg = cfg.with_certificate("/tmp/cert.pem");
        assert_eq!(cfg.api_url, "https://api.sandbox.paypal.com/nvp");

        let mut custom = ClientConfiguration::for_mode(ApiKind::ExpressCheckout, ApiMode::Live, Credentials::default());
        custom.api_url = "https://proxy.internal/nvp".into();
        let custom = custom.with_certificate("/tmp/cert.pem");
        assert_eq!(custom.api_url, "https://proxy.internal/nvp");
    }
}
