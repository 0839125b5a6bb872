//! Interface status and interface configuration parsers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::normalize::{CommandArgs, StructuredRecord};

static BRIEF_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>\S+)\s+(?P<ip>\S+)\s+(?P<ok>YES|NO)\s+(?P<method>\S+)\s+(?P<status>administratively down|up|down|deleted)\s+(?P<protocol>up|down)\s*$",
    )
    .expect("valid ip interface brief pattern")
});

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>\S+) is (?P<status>administratively down|up|down|deleted)(?:\s*\([^)]*\))?, line protocol is (?P<protocol>up|down)",
    )
    .expect("valid interface status pattern")
});

static HARDWARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+Hardware is (?P<type>[^,]+)(?:, address is (?P<mac>\S+))?")
        .expect("valid hardware pattern")
});

static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+Description: (?P<text>.*?)\s*$").expect("valid description pattern"));

static INTERNET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+Internet address is (?P<ip>[\d.]+)/(?P<len>\d+)").expect("valid address pattern")
});

static MTU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+MTU (?P<mtu>\d+) bytes, BW (?P<bw>\d+) Kbit").expect("valid mtu pattern")
});

static ENCAPSULATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+Encapsulation (?P<encap>[\w.\-]+)").expect("valid encapsulation pattern")
});

static PACKETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(?P<pkts>\d+) packets (?P<dir>input|output), (?P<bytes>\d+) bytes")
        .expect("valid counter pattern")
});

static CONFIG_INTERFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^interface (?P<name>\S+)\s*$").expect("valid interface stanza pattern"));

static CONFIG_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ip address (?P<ip>[\d.]+) (?P<mask>[\d.]+)(?P<secondary> secondary)?\s*$")
        .expect("valid ip address pattern")
});

/// Parse `show ip interface brief` into `{"interface": {"<name>": {...}}}`.
pub(super) fn parse_show_ip_interface_brief(output: &str, _: &CommandArgs) -> StructuredRecord {
    let interfaces: Map<String, Value> = output
        .lines()
        .filter_map(|line| BRIEF_ROW.captures(line.trim_end()))
        .map(|caps| {
            (
                caps["name"].to_string(),
                json!({
                    "ip_address": &caps["ip"],
                    "interface_is_ok": &caps["ok"],
                    "method": &caps["method"],
                    "status": &caps["status"],
                    "protocol": &caps["protocol"],
                }),
            )
        })
        .collect();

    single("interface", interfaces)
}

/// Parse `show interfaces [name]` into `{"<name>": {...}}`.
///
/// Covers status, hardware, addressing, MTU/bandwidth, encapsulation and the
/// packet counters; everything else in the block is ignored.
pub(super) fn parse_show_interfaces(output: &str, _: &CommandArgs) -> StructuredRecord {
    let mut record = StructuredRecord::new();
    let mut current: Option<Map<String, Value>> = None;
    let mut current_name = String::new();

    for line in output.lines() {
        let line = line.trim_end();

        if let Some(caps) = STATUS_LINE.captures(line) {
            if let Some(done) = current.take() {
                record.insert(std::mem::take(&mut current_name), Value::Object(done));
            }
            let status = &caps["status"];
            let mut fields = Map::new();
            fields.insert("oper_status".into(), json!(status.trim_start_matches("administratively ")));
            fields.insert("enabled".into(), json!(status != "administratively down"));
            fields.insert("line_protocol".into(), json!(&caps["protocol"]));
            current_name = caps["name"].to_string();
            current = Some(fields);
            continue;
        }

        let Some(fields) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = HARDWARE.captures(line) {
            fields.insert("type".into(), json!(caps["type"].trim()));
            if let Some(mac) = caps.name("mac") {
                fields.insert("mac_address".into(), json!(mac.as_str()));
            }
        } else if let Some(caps) = DESCRIPTION.captures(line) {
            fields.insert("description".into(), json!(&caps["text"]));
        } else if let Some(caps) = INTERNET_ADDRESS.captures(line) {
            let key = format!("{}/{}", &caps["ip"], &caps["len"]);
            fields.insert(
                "ipv4".into(),
                json!({ key: { "ip": &caps["ip"], "prefix_length": &caps["len"] } }),
            );
        } else if let Some(caps) = MTU.captures(line) {
            fields.insert("mtu".into(), json!(caps["mtu"].parse::<u64>().unwrap_or_default()));
            fields.insert("bandwidth".into(), json!(caps["bw"].parse::<u64>().unwrap_or_default()));
        } else if let Some(caps) = ENCAPSULATION.captures(line) {
            fields.insert("encapsulations".into(), json!({ "encapsulation": caps["encap"].to_lowercase() }));
        } else if let Some(caps) = PACKETS.captures(line) {
            let (pkts, octets) = match &caps["dir"] {
                "input" => ("in_pkts", "in_octets"),
                _ => ("out_pkts", "out_octets"),
            };
            let counters = fields
                .entry("counters")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(counters) = counters {
                counters.insert(pkts.into(), json!(caps["pkts"].parse::<u64>().unwrap_or_default()));
                counters.insert(octets.into(), json!(caps["bytes"].parse::<u64>().unwrap_or_default()));
            }
        }
    }

    if let Some(done) = current {
        record.insert(current_name, Value::Object(done));
    }
    record
}

/// Parse `show running-config interface <name>` into
/// `{"interfaces": {"<name>": {...}}}`.
///
/// Every sub-command is kept verbatim under `config`; description, primary
/// IPv4 address, shutdown state and access VLAN are lifted into fields.
pub(super) fn parse_running_config_interface(output: &str, _: &CommandArgs) -> StructuredRecord {
    let mut interfaces: Map<String, Value> = Map::new();
    let mut current: Option<(String, Map<String, Value>, Vec<Value>)> = None;

    let mut finish = |current: &mut Option<(String, Map<String, Value>, Vec<Value>)>| {
        if let Some((name, mut fields, config)) = current.take() {
            fields.insert("config".into(), Value::Array(config));
            interfaces.insert(name, Value::Object(fields));
        }
    };

    for line in output.lines() {
        let line = line.trim_end();

        if let Some(caps) = CONFIG_INTERFACE.captures(line) {
            finish(&mut current);
            let mut fields = Map::new();
            fields.insert("shutdown".into(), json!(false));
            current = Some((caps["name"].to_string(), fields, vec![]));
            continue;
        }

        let Some((_, fields, config)) = current.as_mut() else {
            continue;
        };

        // Sub-commands are indented; anything else ends the stanza
        let Some(sub) = line.strip_prefix(' ') else {
            finish(&mut current);
            continue;
        };
        let sub = sub.trim_start();
        config.push(json!(sub));

        if let Some(text) = sub.strip_prefix("description ") {
            fields.insert("description".into(), json!(text));
        } else if let Some(caps) = CONFIG_ADDRESS.captures(sub) {
            if caps.name("secondary").is_none() {
                fields.insert(
                    "ipv4".into(),
                    json!({ "ip": &caps["ip"], "netmask": &caps["mask"] }),
                );
            }
        } else if sub == "shutdown" {
            fields.insert("shutdown".into(), json!(true));
        } else if let Some(vlan) = sub.strip_prefix("switchport access vlan ") {
            fields.insert("access_vlan".into(), json!(vlan));
        } else if let Some(mode) = sub.strip_prefix("switchport mode ") {
            fields.insert("switchport_mode".into(), json!(mode));
        }
    }
    finish(&mut current);

    single("interfaces", interfaces)
}

fn single(key: &str, entries: Map<String, Value>) -> StructuredRecord {
    let mut record = StructuredRecord::new();
    if !entries.is_empty() {
        record.insert(key.to_string(), Value::Object(entries));
    }
    record
}
