use clap::{Parser, Subcommand};
use paypal_http::{ApiRequest, ApiResponse, ClientConfiguration, PayPalHttpClient, RequestPayload};
use serde_json::Value;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paypal-request", version, about = "Send one request to the PayPal classic APIs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call an API method, e.g. SetExpressCheckout or Pay
    Call {
        method: String,
        /// Request parameter as KEY=VALUE, repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Sent as PAYPAL-CLIENT-METADATA-ID
        #[arg(long, env = "PAYPAL_FRAUDNET_ID")]
        fraudnet_id: Option<String>,
    },
    /// Post an IPN message back to PayPal for validation
    VerifyIpn {
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn to_payload(params: Vec<(String, String)>) -> RequestPayload {
    params.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match ClientConfiguration::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    let client = match PayPalHttpClient::configure(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let response = match cli.command {
        Commands::Call { method, params, fraudnet_id } => {
            let mut request = ApiRequest::new(method);
            request.params = to_payload(params);
            request.fraudnet_id = fraudnet_id;
            client.execute(&request).await
        }
        Commands::VerifyIpn { params } => client.verify_ipn(&to_payload(params)).await,
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to render response: {}", e);
            process::exit(1);
        }
    }
    if let ApiResponse::Error(_) = response {
        process::exit(1);
    }
}
