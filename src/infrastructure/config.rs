use std::env;
use std::path::PathBuf;
use std::time::Duration;
use once_cell::sync::Lazy;

use crate::domain::entities::{ApiKind, ApiMode, ClientConfiguration, Credentials};
use crate::domain::error::PayPalError;

pub const API_VERSION: &str = "123";
pub const FRAUDNET_HEADER: &str = "PAYPAL-CLIENT-METADATA-ID";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const NVP_SANDBOX_URL: &str = "https://api-3t.sandbox.paypal.com/nvp";
const NVP_SANDBOX_CERT_URL: &str = "https://api.sandbox.paypal.com/nvp";
const NVP_LIVE_URL: &str = "https://api-3t.paypal.com/nvp";
const NVP_LIVE_CERT_URL: &str = "https://api.paypal.com/nvp";
const ADAPTIVE_SANDBOX_URL: &str = "https://svcs.sandbox.paypal.com/AdaptivePayments/";
const ADAPTIVE_LIVE_URL: &str = "https://svcs.paypal.com/AdaptivePayments/";
const IPN_SANDBOX_URL: &str = "https://ipnpb.sandbox.paypal.com/cgi-bin/webscr";
const IPN_LIVE_URL: &str = "https://ipnpb.paypal.com/cgi-bin/webscr";

pub static PAYPAL_MODE: Lazy<String> = Lazy::new(|| {
    env::var("PAYPAL_MODE").unwrap_or_else(|_| "sandbox".to_string())
});
pub static PAYPAL_API_KIND: Lazy<String> = Lazy::new(|| {
    env::var("PAYPAL_API_KIND").unwrap_or_else(|_| "express_checkout".to_string())
});
pub static PAYPAL_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("PAYPAL_API_URL").ok());
pub static PAYPAL_NOTIFY_URL: Lazy<Option<String>> = Lazy::new(|| env::var("PAYPAL_NOTIFY_URL").ok());
pub static PAYPAL_CERTIFICATE: Lazy<Option<String>> = Lazy::new(|| {
    env::var("PAYPAL_CERTIFICATE").ok().filter(|v| !v.trim().is_empty())
});
pub static PAYPAL_VALIDATE_SSL: Lazy<bool> = Lazy::new(|| {
    env::var("PAYPAL_VALIDATE_SSL")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
        .unwrap_or(true)
});
pub static PAYPAL_TIMEOUT_MS: Lazy<Option<u64>> = Lazy::new(|| {
    env::var("PAYPAL_TIMEOUT_MS").ok().and_then(|v| v.parse::<u64>().ok())
});

pub fn default_api_url(kind: ApiKind, mode: ApiMode, with_certificate: bool) -> &'static str {
    match (kind, mode, with_certificate) {
        (ApiKind::ExpressCheckout, ApiMode::Sandbox, false) => NVP_SANDBOX_URL,
        (ApiKind::ExpressCheckout, ApiMode::Sandbox, true) => NVP_SANDBOX_CERT_URL,
        (ApiKind::ExpressCheckout, ApiMode::Live, false) => NVP_LIVE_URL,
        (ApiKind::ExpressCheckout, ApiMode::Live, true) => NVP_LIVE_CERT_URL,
        (ApiKind::AdaptivePayments, ApiMode::Sandbox, _) => ADAPTIVE_SANDBOX_URL,
        (ApiKind::AdaptivePayments, ApiMode::Live, _) => ADAPTIVE_LIVE_URL,
    }
}

pub fn default_notify_url(mode: ApiMode) -> &'static str {
    match mode {
        ApiMode::Sandbox => IPN_SANDBOX_URL,
        ApiMode::Live => IPN_LIVE_URL,
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl ClientConfiguration {
    /// Reads `PAYPAL_*` variables. Username and password are required.
    pub fn from_env() -> Result<Self, PayPalError> {
        let credentials = Credentials {
            username: env::var("PAYPAL_USERNAME")
                .map_err(|_| PayPalError::Config("PAYPAL_USERNAME is not set".to_string()))?,
            password: env::var("PAYPAL_PASSWORD")
                .map_err(|_| PayPalError::Config("PAYPAL_PASSWORD is not set".to_string()))?,
            signature: optional_env("PAYPAL_SIGNATURE"),
            app_id: optional_env("PAYPAL_APP_ID"),
            subject: optional_env("PAYPAL_SUBJECT"),
        };
        let kind: ApiKind = PAYPAL_API_KIND.parse()?;
        let mode: ApiMode = PAYPAL_MODE.parse()?;

        let mut config = ClientConfiguration::for_mode(kind, mode, credentials);
        if let Some(cert) = PAYPAL_CERTIFICATE.as_ref() {
            config = config.with_certificate(PathBuf::from(cert));
        }
        if let Some(url) = PAYPAL_API_URL.as_ref() {
            config.api_url = url.clone();
        }
        if let Some(url) = PAYPAL_NOTIFY_URL.as_ref() {
            config.notify_url = url.clone();
        }
        if let Some(ms) = *PAYPAL_TIMEOUT_MS {
            config.timeout = Duration::from_millis(ms);
        }
        config.validate_ssl = *PAYPAL_VALIDATE_SSL;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_mode_and_certificate() {
        assert_eq!(default_api_url(ApiKind::ExpressCheckout, ApiMode::Live, false), NVP_LIVE_URL);
        assert_eq!(default_api_url(ApiKind::ExpressCheckout, ApiMode::Live, true), NVP_LIVE_CERT_URL);
        assert_eq!(
            default_api_url(ApiKind::AdaptivePayments, ApiMode::Sandbox, true),
            ADAPTIVE_SANDBOX_URL
        );
        assert_eq!(default_notify_url(ApiMode::Live), IPN_LIVE_URL);
    }

    #[test]
    fn adaptive_base_url_ends_with_slash() {
        for mode in [ApiMode::Sandbox, ApiMode::Live] {
            assert!(default_api_url(ApiKind::AdaptivePayments, mode, false).ends_with('/'));
        }
    }
}
