//! `show vlan` family.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use super::expand_interface;
use crate::normalize::{CommandArgs, StructuredRecord};

static MEMBERSHIP_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>\d+)\s+(?P<name>\S+)\s+(?P<status>[a-z/]+)\s*(?P<ports>.*)$")
        .expect("valid vlan membership pattern")
});

static ATTRIBUTE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<id>\d+)\s+(?P<type>\S+)\s+(?P<said>\d+)\s+(?P<mtu>\d+)(?:\s+\S+){5}\s+(?P<trans1>\d+)\s+(?P<trans2>\d+)\s*$",
    )
    .expect("valid vlan attribute pattern")
});

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Membership,
    Attributes,
    Other,
}

/// Parse `show vlan`, `show vlan brief` and `show vlan id N`.
///
/// Produces `{"vlans": {"<id>": {...}}}`. Membership rows give `name`,
/// `state`, `shutdown` and `interfaces`; the attribute table, when present,
/// adds `type`, `said`, `mtu`, `trans1` and `trans2`. With a `vlan_id`
/// argument only that VLAN is kept.
pub(super) fn parse_show_vlan(output: &str, args: &CommandArgs) -> StructuredRecord {
    let mut vlans: Map<String, Value> = Map::new();
    let mut section = Section::Preamble;
    let mut current: Option<String> = None;

    for line in output.lines() {
        let trimmed = line.trim_end();
        if trimmed.starts_with("VLAN Name") {
            section = Section::Membership;
            continue;
        }
        if trimmed.starts_with("VLAN Type") {
            section = Section::Attributes;
            current = None;
            continue;
        }
        if trimmed.starts_with("Remote SPAN") || trimmed.starts_with("Primary Secondary") {
            section = Section::Other;
            current = None;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("----") {
            continue;
        }

        match section {
            Section::Membership => {
                if let Some(caps) = MEMBERSHIP_ROW.captures(trimmed) {
                    let id = caps["id"].to_string();
                    let status = &caps["status"];
                    vlans.insert(
                        id.clone(),
                        json!({
                            "vlan_id": id,
                            "name": &caps["name"],
                            "state": vlan_state(status),
                            "shutdown": status.contains("shut"),
                            "interfaces": port_list(&caps["ports"]),
                        }),
                    );
                    current = Some(id);
                } else if line.starts_with(char::is_whitespace) {
                    // Port list wrapped onto the next line
                    let Some(entry) = current.as_ref().and_then(|id| vlans.get_mut(id)) else {
                        continue;
                    };
                    if let Some(Value::Array(ports)) = entry.get_mut("interfaces") {
                        ports.extend(port_list(trimmed));
                    }
                }
            }
            Section::Attributes => {
                let Some(caps) = ATTRIBUTE_ROW.captures(trimmed) else {
                    continue;
                };
                let entry = vlans
                    .entry(caps["id"].to_string())
                    .or_insert_with(|| json!({ "vlan_id": &caps["id"] }));
                if let Value::Object(fields) = entry {
                    fields.insert("type".into(), json!(&caps["type"]));
                    fields.insert("said".into(), number(&caps["said"]));
                    fields.insert("mtu".into(), number(&caps["mtu"]));
                    fields.insert("trans1".into(), number(&caps["trans1"]));
                    fields.insert("trans2".into(), number(&caps["trans2"]));
                }
            }
            Section::Preamble | Section::Other => {}
        }
    }

    if let Some(wanted) = args.get("vlan_id") {
        vlans.retain(|id, _| id == wanted);
    }

    let mut record = StructuredRecord::new();
    if !vlans.is_empty() {
        record.insert("vlans".to_string(), Value::Object(vlans));
    }
    record
}

fn vlan_state(status: &str) -> &'static str {
    match status.split('/').next().unwrap_or_default() {
        "active" | "act" => "active",
        "suspended" | "sus" => "suspended",
        _ => "unsupported",
    }
}

fn port_list(ports: &str) -> Vec<Value> {
    ports
        .split(',')
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .map(|port| Value::String(expand_interface(port)))
        .collect()
}

fn number(text: &str) -> Value {
    text.parse::<u64>().map_or_else(|_| json!(text), |n| json!(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_VLAN: &str = "\
VLAN Name                             Status    Ports
---- -------------------------------- --------- -------------------------------
1    default                          active    Gi1/0/1, Gi1/0/2, Gi1/0/3
                                                Gi1/0/4
10   users                            active    Gi1/0/5
20   voice                            act/lshut
1002 fddi-default                     act/unsup

VLAN Type  SAID       MTU   Parent RingNo BridgeNo Stp  BrdgMode Trans1 Trans2
---- ----- ---------- ----- ------ ------ -------- ---- -------- ------ ------
1    enet  100001     1500  -      -      -        -    -        0      0
10   enet  100010     1500  -      -      -        -    -        0      0
20   enet  100020     1500  -      -      -        -    -        0      0

Remote SPAN VLANs
------------------------------------------------------------------------------

Primary Secondary Type              Ports
------- --------- ----------------- ------------------------------------------
";

    #[test]
    fn test_membership_and_attributes() {
        let record = parse_show_vlan(SHOW_VLAN, &CommandArgs::new());
        let vlans = &record["vlans"];

        assert_eq!(vlans["1"]["name"], json!("default"));
        assert_eq!(vlans["1"]["state"], json!("active"));
        assert_eq!(vlans["1"]["shutdown"], json!(false));
        assert_eq!(
            vlans["1"]["interfaces"],
            json!([
                "GigabitEthernet1/0/1",
                "GigabitEthernet1/0/2",
                "GigabitEthernet1/0/3",
                "GigabitEthernet1/0/4"
            ])
        );
        assert_eq!(vlans["10"]["said"], json!(100010));
        assert_eq!(vlans["10"]["mtu"], json!(1500));
        assert_eq!(vlans["20"]["shutdown"], json!(true));
        assert_eq!(vlans["20"]["interfaces"], json!([]));
        assert_eq!(vlans["1002"]["state"], json!("active"));
    }

    #[test]
    fn test_vlan_id_filter() {
        let args = CommandArgs::from([("vlan_id".to_string(), "10".to_string())]);
        let record = parse_show_vlan(SHOW_VLAN, &args);
        let vlans = record["vlans"].as_object().unwrap();

        assert_eq!(vlans.len(), 1);
        assert_eq!(vlans["10"]["name"], json!("users"));
    }

    #[test]
    fn test_brief_without_attribute_table() {
        let brief = SHOW_VLAN.split("\nVLAN Type").next().unwrap();
        let record = parse_show_vlan(brief, &CommandArgs::new());
        assert!(record["vlans"]["10"].get("mtu").is_none());
    }

    #[test]
    fn test_unknown_vlan_and_garbage() {
        assert!(parse_show_vlan("VLAN id 999 not found in current VLAN database", &CommandArgs::new()).is_empty());
        assert!(parse_show_vlan("", &CommandArgs::new()).is_empty());
    }
}
