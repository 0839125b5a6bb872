//! `show cdp neighbors`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use super::expand_interface;
use crate::normalize::{CommandArgs, StructuredRecord};

// Local interface, hold time and the remaining columns of one neighbor.
static DETAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<local>[A-Za-z\-]+\s?[\d/.:]+)\s+(?P<hold>\d+)\s+(?P<rest>\S.*)$")
        .expect("valid cdp detail pattern")
});

static TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Total cdp entries displayed\s*:\s*(?P<total>\d+)").expect("valid cdp total pattern")
});

const CAPABILITY_CODES: &str = "RTBSHIrPDCM";

/// Parse `show cdp neighbors`.
///
/// Produces `{"cdp": {"index": {"1": {...}, ...}, "total_entries_displayed": N}}`.
/// A device ID too long for its column sits on its own line and the rest of
/// the row follows, indented, on the next one.
pub(super) fn parse_show_cdp_neighbors(output: &str, _: &CommandArgs) -> StructuredRecord {
    let mut index: Map<String, Value> = Map::new();
    let mut total: Option<u64> = None;
    let mut in_table = false;
    let mut pending_device: Option<String> = None;

    for line in output.lines() {
        let line = line.trim_end();

        if let Some(caps) = TOTAL.captures(line) {
            total = caps["total"].parse().ok();
            continue;
        }
        if line.starts_with("Device ID") {
            in_table = true;
            continue;
        }
        if !in_table || line.is_empty() {
            continue;
        }

        let (device, detail) = if line.starts_with(char::is_whitespace) {
            match pending_device.take() {
                Some(device) => (device, line.trim_start()),
                None => continue,
            }
        } else {
            let mut parts = line.splitn(2, char::is_whitespace);
            let device = parts.next().unwrap_or_default().to_string();
            match parts.next().map(str::trim_start) {
                Some(detail) if !detail.is_empty() => (device, detail),
                _ => {
                    pending_device = Some(device);
                    continue;
                }
            }
        };

        let Some(caps) = DETAIL.captures(detail) else {
            continue;
        };
        let (capability, platform, port_id) = split_remainder(&caps["rest"]);

        let position = (index.len() + 1).to_string();
        index.insert(
            position,
            json!({
                "device_id": device,
                "local_interface": expand_interface(&caps["local"]),
                "hold_time": caps["hold"].parse::<u64>().unwrap_or_default(),
                "capability": capability,
                "platform": platform,
                "port_id": expand_interface(&port_id),
            }),
        );
    }

    let mut record = StructuredRecord::new();
    if index.is_empty() {
        return record;
    }

    let mut cdp = Map::new();
    cdp.insert("index".into(), Value::Object(index));
    if let Some(total) = total {
        cdp.insert("total_entries_displayed".into(), json!(total));
    }
    record.insert("cdp".to_string(), Value::Object(cdp));
    record
}

/// Split `R S I  C9300-48U For 1/1/1` into capability, platform and port.
fn split_remainder(rest: &str) -> (String, String, String) {
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();

    let n = tokens.len();
    let spaced_port = n >= 2
        && tokens[n - 1].starts_with(|c: char| c.is_ascii_digit())
        && tokens[n - 2].chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    let port_id = if spaced_port {
        let port = format!("{} {}", tokens[n - 2], tokens[n - 1]);
        tokens.truncate(n - 2);
        port
    } else {
        tokens.pop().unwrap_or_default().to_string()
    };

    let platform = if tokens.last().is_some_and(|token| !is_capability(token)) {
        tokens.pop().unwrap_or_default().to_string()
    } else {
        String::new()
    };

    (tokens.join(" "), platform, port_id)
}

fn is_capability(token: &str) -> bool {
    token.len() == 1 && CAPABILITY_CODES.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_CDP_NEIGHBORS: &str = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge
                  S - Switch, H - Host, I - IGMP, r - Repeater, P - Phone,
                  D - Remote, C - CVTA, M - Two-port Mac Relay

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
DUS-9300-FE01-B2-F04.example.com
                 For 1/0/15        172             R S I  C9300-48U For 1/1/1
DUS-9500-FR01-B1-F00.example.com
                 For 1/0/4         153             R S I  C9500-48Y Hun 2/0/51
Switch           For 1/0/8         139              S I   C9300-48U For 1/1/1
rtr-edge         Gig 0/0/1         121              R I   ISR4331   Gig 0/0/0

Total cdp entries displayed : 4";

    #[test]
    fn test_wrapped_and_single_line_rows() {
        let record = parse_show_cdp_neighbors(SHOW_CDP_NEIGHBORS, &CommandArgs::new());
        let cdp = &record["cdp"];
        let index = cdp["index"].as_object().unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(cdp["total_entries_displayed"], json!(4));

        let first = &index["1"];
        assert_eq!(first["device_id"], json!("DUS-9300-FE01-B2-F04.example.com"));
        assert_eq!(first["local_interface"], json!("FortyGigabitEthernet1/0/15"));
        assert_eq!(first["hold_time"], json!(172));
        assert_eq!(first["capability"], json!("R S I"));
        assert_eq!(first["platform"], json!("C9300-48U"));
        assert_eq!(first["port_id"], json!("FortyGigabitEthernet1/1/1"));

        assert_eq!(index["2"]["port_id"], json!("HundredGigE2/0/51"));

        let third = &index["3"];
        assert_eq!(third["device_id"], json!("Switch"));
        assert_eq!(third["capability"], json!("S I"));
        assert_eq!(third["local_interface"], json!("FortyGigabitEthernet1/0/8"));

        assert_eq!(index["4"]["local_interface"], json!("GigabitEthernet0/0/1"));
        assert_eq!(index["4"]["platform"], json!("ISR4331"));
    }

    #[test]
    fn test_split_remainder_without_platform() {
        assert_eq!(
            split_remainder("S I Gi0/1"),
            ("S I".to_string(), String::new(), "Gi0/1".to_string())
        );
    }

    #[test]
    fn test_no_neighbors() {
        let empty = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID

Total cdp entries displayed : 0";
        assert!(parse_show_cdp_neighbors(empty, &CommandArgs::new()).is_empty());
        assert!(parse_show_cdp_neighbors("% CDP is not enabled", &CommandArgs::new()).is_empty());
    }
}
