pub mod utils;
pub mod config;
pub mod http_clients;

pub use utils::{
    decode_nvp, encode_form, encode_json, error_chain, EncodedBody
};

pub use http_clients::{
    build_client, header_map, post_request, transport_code
};
