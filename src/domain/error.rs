use thiserror::Error;

pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PayPalError {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No response came back (connect failure, timeout, broken body).
    #[error("{message} body {request_body} #{code}")]
    Transport {
        message: String,
        request_body: String,
        code: i64,
        #[source]
        source: reqwest::Error,
    },

    /// A response came back with a non-success status.
    #[error("{message} body {request_body} status {status} {response_body}")]
    HttpStatus {
        message: String,
        request_body: String,
        status: u16,
        response_body: String,
    },

    #[error("payload: {0}")]
    Payload(String),

    #[error("unable to extract response: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<AnyError>,
    },
}

impl PayPalError {
    /// Numeric code carried into `ErrorResult::code`.
    pub fn code(&self) -> i64 {
        match self {
            PayPalError::Transport { code, .. } => *code,
            PayPalError::HttpStatus { status, .. } => i64::from(*status),
            PayPalError::Config(_) | PayPalError::Payload(_) | PayPalError::Extraction { .. } => 0,
        }
    }
}
