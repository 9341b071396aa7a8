use crate::application::extract::{JsonExtractor, NvpExtractor, ResponseExtractor, TextExtractor};
use crate::application::payload::{JsonPayloadBuilder, NvpPayloadBuilder, PayloadBuilder};
use crate::domain::entities::{ApiKind, ApiRequest, ApiResponse, ClientConfiguration, RequestPayload};
use crate::domain::error::PayPalError;
use crate::infrastructure::config::FRAUDNET_HEADER;
use crate::infrastructure::{
    build_client, encode_form, encode_json, header_map, post_request, transport_code, EncodedBody,
};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const IPN_VALIDATE_CMD: (&str, &str) = ("cmd", "_notify-validate");

/// Adapter around one configured `reqwest::Client`. Configuration is fixed
/// at `configure`; every call afterward only reads it, so the adapter can be
/// shared behind an `Arc`.
pub struct PayPalHttpClient {
    client: Client,
    config: ClientConfiguration,
    payload_builder: Arc<dyn PayloadBuilder>,
    extractor: Arc<dyn ResponseExtractor>,
}

fn validate_url(name: &str, value: &str) -> Result<(), PayPalError> {
    let url = Url::parse(value)
        .map_err(|e| PayPalError::Config(format!("{} '{}' is not a valid url: {}", name, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PayPalError::Config(format!("{} has unsupported scheme '{}'", name, other))),
    }
}

fn transport_error(err: reqwest::Error, body: &EncodedBody) -> PayPalError {
    PayPalError::Transport {
        message: err.to_string(),
        request_body: body.as_text(),
        code: transport_code(&err),
        source: err,
    }
}

impl PayPalHttpClient {
    pub fn configure(mut config: ClientConfiguration) -> Result<Self, PayPalError> {
        validate_url("api_url", &config.api_url)?;
        validate_url("notify_url", &config.notify_url)?;
        if config.kind == ApiKind::AdaptivePayments && !config.api_url.ends_with('/') {
            config.api_url.push('/');
        }

        let client = build_client(&config)?;
        let (payload_builder, extractor): (Arc<dyn PayloadBuilder>, Arc<dyn ResponseExtractor>) =
            match config.kind {
                ApiKind::ExpressCheckout => (
                    Arc::new(NvpPayloadBuilder::new(config.credentials.clone())),
                    Arc::new(NvpExtractor),
                ),
                ApiKind::AdaptivePayments => (Arc::new(JsonPayloadBuilder), Arc::new(JsonExtractor)),
            };

        info!(
            kind = ?config.kind,
            mode = ?config.mode,
            api_url = %config.api_url,
            validate_ssl = config.validate_ssl,
            certificate = config.certificate.is_some(),
            "paypal client configured"
        );

        Ok(PayPalHttpClient {
            client,
            config,
            payload_builder,
            extractor,
        })
    }

    pub fn with_payload_builder(mut self, builder: impl PayloadBuilder + 'static) -> Self {
        self.payload_builder = Arc::new(builder);
        self
    }

    pub fn with_extractor(mut self, extractor: impl ResponseExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    fn endpoint(&self, method: &str) -> String {
        match self.config.kind {
            ApiKind::ExpressCheckout => self.config.api_url.clone(),
            ApiKind::AdaptivePayments => format!("{}{}", self.config.api_url, method),
        }
    }

    fn encode(&self, payload: &RequestPayload) -> Result<EncodedBody, PayPalError> {
        match self.config.kind {
            ApiKind::ExpressCheckout => encode_form(&[], payload),
            ApiKind::AdaptivePayments => encode_json(payload),
        }
    }

    fn api_headers(&self) -> Vec<(&'static str, String)> {
        if self.config.kind != ApiKind::AdaptivePayments {
            return Vec::new();
        }
        let creds = &self.config.credentials;
        let mut headers = vec![
            ("X-PAYPAL-SECURITY-USERID", creds.username.clone()),
            ("X-PAYPAL-SECURITY-PASSWORD", creds.password.clone()),
            ("X-PAYPAL-REQUEST-DATA-FORMAT", "JSON".to_string()),
            ("X-PAYPAL-RESPONSE-DATA-FORMAT", "JSON".to_string()),
        ];
        if let Some(signature) = &creds.signature {
            headers.push(("X-PAYPAL-SECURITY-SIGNATURE", signature.clone()));
        }
        if let Some(app_id) = &creds.app_id {
            headers.push(("X-PAYPAL-APPLICATION-ID", app_id.clone()));
        }
        headers
    }

    /// Issues one POST for `method` and returns the raw response body.
    pub async fn send(
        &self,
        method: &str,
        payload: &RequestPayload,
        fraudnet_id: Option<&str>,
    ) -> Result<Bytes, PayPalError> {
        let body = self.encode(payload)?;
        let mut headers = self.api_headers();
        if let Some(id) = fraudnet_id.filter(|id| !id.is_empty()) {
            headers.push((FRAUDNET_HEADER, id.to_string()));
        }
        let headers = header_map(&headers)?;
        self.post(&self.endpoint(method), body, headers).await
    }

    async fn post(&self, url: &str, body: EncodedBody, headers: HeaderMap) -> Result<Bytes, PayPalError> {
        debug!(url, bytes = body.bytes.len(), "sending paypal request");
        let response = post_request(&self.client, url, &body, headers)
            .await
            .map_err(|e| transport_error(e, &body))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.error_for_status_ref() {
                Err(e) => e.to_string(),
                Ok(_) => format!("HTTP status {}", status),
            };
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(PayPalError::HttpStatus {
                message,
                request_body: body.as_text(),
                status: status.as_u16(),
                response_body,
            });
        }

        debug!(url, status = status.as_u16(), "paypal response received");
        response.bytes().await.map_err(|e| transport_error(e, &body))
    }

    /// Build, send and extract, keeping the typed error.
    pub async fn try_execute(&self, request: &ApiRequest) -> Result<Value, PayPalError> {
        let payload = self.payload_builder.build(&request.method, &request.params)?;
        let body = self.send(&request.method, &payload, request.fraudnet_id.as_deref()).await?;
        self.extractor.extract(&request.method, &body)
    }

    /// Never fails: any error on the way becomes an `ErrorResult`.
    #[tracing::instrument(skip_all, fields(method = %request.method))]
    pub async fn execute(&self, request: &ApiRequest) -> ApiResponse {
        let result = self.try_execute(request).await;
        if let Err(e) = &result {
            warn!(code = e.code(), error = %e, "paypal request failed");
        }
        result.into()
    }

    /// Posts an IPN message back to the notification URL for validation.
    #[tracing::instrument(skip_all)]
    pub async fn verify_ipn(&self, params: &RequestPayload) -> ApiResponse {
        let result = self.try_verify_ipn(params).await;
        if let Err(e) = &result {
            warn!(code = e.code(), error = %e, "ipn validation failed");
        }
        result.into()
    }

    async fn try_verify_ipn(&self, params: &RequestPayload) -> Result<Value, PayPalError> {
        // PayPal only answers VERIFIED when the fields come back in the order received.
        let fields: RequestPayload = params
            .iter()
            .filter(|(k, _)| k.as_str() != IPN_VALIDATE_CMD.0)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let body = encode_form(&[IPN_VALIDATE_CMD], &fields)?;
        let raw = self.post(&self.config.notify_url, body, HeaderMap::new()).await?;
        TextExtractor.extract("ipn", &raw)
    }
}
