pub mod extract;
pub mod payload;
pub mod services;

pub use services::PayPalHttpClient;
