//! One-shot request runner.
//!
//! Resolves a single API request, runs it against the device over SSH and
//! prints the JSON body.
//!
//! ```bash
//! export NETGATE_USERNAME=admin NETGATE_PASSWORD=secret
//! netgate-api GET '/10.0.0.1/vlans/?vlan_id=10'
//! netgate-api POST /10.0.0.1/interfaces/ --data '{"name": "gi0/0", "enabled": false}'
//! ```

use std::env;
use std::process::ExitCode;

use log::error;

use netgate::Gateway;
use netgate_api::{Api, ApiConfig, ApiResponse};

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG=debug shows every exchange with the device
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = Args::parse() else {
        Args::print_help();
        return ExitCode::FAILURE;
    };

    let response = match run(&args).await {
        Ok(response) => response,
        Err(e) => {
            error!("{}", e);
            ApiResponse::from(e)
        }
    };

    println!("{}", response.body);
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(args: &Args) -> netgate_api::Result<ApiResponse> {
    let config = ApiConfig::from_env()?;
    let gateway = Gateway::ssh(config.gateway_options())?;
    let api = Api::new(gateway, config);
    Ok(api.handle(&args.method, &args.path, args.data.as_deref()).await)
}

/// Simple argument parser
struct Args {
    method: String,
    path: String,
    data: Option<String>,
}

impl Args {
    fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        let mut positional = Vec::new();
        let mut data = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--data" | "-d" => {
                    i += 1;
                    data = Some(args.get(i)?.clone());
                }
                "--help" | "-h" => return None,
                other => positional.push(other.to_string()),
            }
            i += 1;
        }

        let [method, path] = <[String; 2]>::try_from(positional).ok()?;
        Some(Self {
            method: method.to_ascii_uppercase(),
            path,
            data,
        })
    }

    fn print_help() {
        eprintln!(
            r#"netgate-api

USAGE:
    netgate-api <METHOD> <PATH> [--data <JSON>]

OPTIONS:
    -d, --data <JSON>    Request body for POST routes
    -h, --help           Print this help message

ROUTES:
    GET  /
    GET  /{{host}}/vlans/[?vlan_id=<id>]
    GET  /{{host}}/ip-interfaces/
    GET  /{{host}}/interfaces/[?interface_name=<name>]
    GET  /{{host}}/interfaces-config/?interface_name=<name>
    POST /{{host}}/interfaces/ --data '{{"name": "gi0/0", "description": "uplink"}}'

ENVIRONMENT:
    NETGATE_USERNAME, NETGATE_PASSWORD   Device credentials (falls back to
                                         IOS_USERNAME/IOS_PASSWORD, then
                                         USERNAME/PASSWORD)
    NETGATE_PLATFORM                     Platform name [default: cisco_iosxe]
    NETGATE_PORT                         SSH port [default: 22]
    NETGATE_STRICT_HOST_KEY              Require a known host key (true/1)
    NETGATE_TIMEOUT_SECS                 Per-operation timeout [default: 30]
    RUST_LOG                             Log filter [default: info]"#
        );
    }
}
