use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::tls::Version;
use reqwest::{Client, Identity, Response};

use crate::domain::entities::ClientConfiguration;
use crate::domain::error::PayPalError;
use crate::infrastructure::utils::EncodedBody;

/// Builds the transport once for an adapter: TLS 1.2 only, peer verification
/// from `validate_ssl`, client identity from the PEM file at `certificate`.
pub fn build_client(config: &ClientConfiguration) -> Result<Client, PayPalError> {
    let mut builder = Client::builder()
        .min_tls_version(Version::TLS_1_2)
        .max_tls_version(Version::TLS_1_2)
        .danger_accept_invalid_certs(!config.validate_ssl)
        .timeout(config.timeout);

    if let Some(path) = &config.certificate {
        let pem = std::fs::read(path).map_err(|e| {
            PayPalError::Config(format!("unable to read certificate {}: {}", path.display(), e))
        })?;
        let identity = Identity::from_pem(&pem).map_err(|e| {
            PayPalError::Config(format!("invalid certificate {}: {}", path.display(), e))
        })?;
        builder = builder.identity(identity);
    }

    builder
        .build()
        .map_err(|e| PayPalError::Config(format!("failed to build http client: {}", e)))
}

pub fn header_map(headers: &[(&str, String)]) -> Result<HeaderMap, PayPalError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PayPalError::Payload(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PayPalError::Payload(format!("invalid value for header {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub async fn post_request(
    client: &Client,
    url: &str,
    body: &EncodedBody,
    headers: HeaderMap,
) -> Result<Response, reqwest::Error> {
    client
        .post(url)
        .headers(headers)
        .header(CONTENT_TYPE, body.content_type)
        .body(body.bytes.clone())
        .send()
        .await
}

/// Numeric code for a failure that produced no response. Values follow the
/// libcurl error numbers PayPal integrations usually log.
pub fn transport_code(err: &reqwest::Error) -> i64 {
    if err.is_timeout() {
        28
    } else if err.is_connect() {
        7
    } else if err.is_redirect() {
        47
    } else if err.is_body() || err.is_decode() {
        56
    } else if err.is_builder() {
        3
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ApiKind, ApiMode, Credentials};
    use std::io::Write;

    fn config() -> ClientConfiguration {
        ClientConfiguration::for_mode(ApiKind::ExpressCheckout, ApiMode::Sandbox, Credentials::default())
    }

    #[test]
    fn builds_without_certificate() {
        assert!(build_client(&config()).is_ok());
    }

    #[test]
    fn builds_with_ssl_verification_off() {
        let mut cfg = config();
        cfg.validate_ssl = false;
        assert!(build_client(&cfg).is_ok());
    }

    #[test]
    fn missing_certificate_is_a_config_error() {
        let cfg = config().with_certificate("/definitely/not/here.pem");
        match build_client(&cfg) {
            Err(PayPalError::Config(msg)) => assert!(msg.contains("unable to read certificate")),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn builds_with_client_certificate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(include_bytes!("../../tests/fixtures/client.pem")).unwrap();
        let cfg = config().with_certificate(file.path());
        assert!(build_client(&cfg).is_ok());
    }

    #[test]
    fn garbage_certificate_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a pem file").unwrap();
        let cfg = config().with_certificate(file.path());
        assert!(matches!(build_client(&cfg), Err(PayPalError::Config(_))));
    }

    #[test]
    fn header_map_rejects_bad_values() {
        assert!(header_map(&[("X-OK", "fine".to_string())]).is_ok());
        assert!(header_map(&[("X-BAD", "line\nbreak".to_string())]).is_err());
    }
}
