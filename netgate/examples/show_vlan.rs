//! Gateway example: structured show commands against a Cisco IOS-XE device.
//!
//! Runs `show vlan` (parsed by the built-in parser), `show version` (parsed
//! with a TextFSM template) and `show clock` (no parser, returned as text).
//!
//! # Usage
//!
//! ```bash
//! cargo run --example show_vlan -- --host 10.0.0.1 --user admin --password secret
//! ```

use std::env;
use std::time::Duration;

use netgate::{CommandGateway, CommandRequest, DeviceTarget, Gateway, GatewayOptions, TextTemplate};

const SHOW_VERSION: &str = include_str!("templates/cisco_iosxe_show_version.textfsm");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = GatewayOptions::default().operation_timeout(Duration::from_secs(args.timeout));
    let gateway = Gateway::ssh(options)?;
    let target = DeviceTarget::new(&args.host, &args.user, &args.password).with_port(args.port);

    println!("--- show vlan ---");
    let output = gateway
        .run_command(&target, CommandRequest::command("show vlan"))
        .await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    println!("--- show version ---");
    let request = CommandRequest::command("show version").with_template(TextTemplate::new(SHOW_VERSION)?);
    let output = gateway.run_command(&target, request).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    println!("--- show clock ---");
    let output = gateway
        .run_command(&target, CommandRequest::command("show clock"))
        .await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            password: String::new(),
            timeout: 30,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match (args[i].as_str(), value) {
                ("--host" | "-h", Some(v)) => parsed.host = v,
                ("--port" | "-p", Some(v)) => parsed.port = v.parse().unwrap_or(22),
                ("--user" | "-u", Some(v)) => parsed.user = v,
                ("--password" | "-P", Some(v)) => parsed.password = v,
                ("--timeout" | "-t", Some(v)) => parsed.timeout = v.parse().unwrap_or(30),
                (other, _) => {
                    eprintln!("Unknown argument: {}", other);
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }
        parsed
    }
}
