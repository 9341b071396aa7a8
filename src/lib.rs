pub use crate::application::PayPalHttpClient;
pub use crate::domain::entities::{
    ApiKind, ApiMode, ApiRequest, ApiResponse, ClientConfiguration, Credentials, ErrorResult,
    RequestPayload,
};
pub use crate::domain::error::PayPalError;

pub mod infrastructure;
pub mod domain;
pub mod application;
