//! Cisco IOS-XE support: prompts, failure markers and show-command parsers.

mod interfaces;
mod neighbors;
mod platform;
mod vlan;

pub use platform::{FAILURE_MARKERS, NAME, platform};

use std::sync::Arc;

use crate::error::Result;
use crate::normalize::{CommandParser, ParserRegistry};

/// Register every IOS-XE parser under its command patterns.
pub fn register_parsers(registry: &mut ParserRegistry) -> Result<()> {
    let table: [(&[&str], Arc<dyn CommandParser>); 5] = [
        (
            &["show vlan", "show vlan brief", "show vlan id {vlan_id}"],
            Arc::new(vlan::parse_show_vlan),
        ),
        (
            &["show ip interface brief", "show ip int brief", "show ip int br"],
            Arc::new(interfaces::parse_show_ip_interface_brief),
        ),
        (
            &["show interfaces", "show interfaces {interface}", "show interface {interface}"],
            Arc::new(interfaces::parse_show_interfaces),
        ),
        (
            &[
                "show running-config interface {interface}",
                "show run interface {interface}",
                "show run int {interface}",
            ],
            Arc::new(interfaces::parse_running_config_interface),
        ),
        (
            &["show cdp neighbors", "show cdp neighbor"],
            Arc::new(neighbors::parse_show_cdp_neighbors),
        ),
    ];

    for (patterns, parser) in table {
        for pattern in patterns {
            registry.register_shared(NAME, pattern, parser.clone())?;
        }
    }
    Ok(())
}

/// Expand an abbreviated interface name (`Gi1/0/1`, `For 1/0/8`) to the
/// long form IOS uses in configuration (`GigabitEthernet1/0/1`).
///
/// Names that are already long, or whose prefix is unknown, come back
/// with only the inner space removed.
pub(crate) fn expand_interface(name: &str) -> String {
    const LONG_NAMES: &[&str] = &[
        "GigabitEthernet",
        "TenGigabitEthernet",
        "TwentyFiveGigE",
        "FortyGigabitEthernet",
        "HundredGigE",
        "FastEthernet",
        "Ethernet",
        "Port-channel",
        "Loopback",
        "Vlan",
        "Tunnel",
        "AppGigabitEthernet",
    ];

    let compact: String = name.split_whitespace().collect();
    let split = compact
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(compact.len());
    let (prefix, number) = compact.split_at(split);
    if prefix.is_empty() {
        return compact;
    }

    let lower = prefix.to_ascii_lowercase();
    match LONG_NAMES
        .iter()
        .find(|long| long.to_ascii_lowercase().starts_with(&lower))
    {
        Some(long) => format!("{long}{number}"),
        None => compact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_interface() {
        assert_eq!(expand_interface("Gi1/0/1"), "GigabitEthernet1/0/1");
        assert_eq!(expand_interface("Te1/1/1"), "TenGigabitEthernet1/1/1");
        assert_eq!(expand_interface("Twe1/0/1"), "TwentyFiveGigE1/0/1");
        assert_eq!(expand_interface("For 1/0/8"), "FortyGigabitEthernet1/0/8");
        assert_eq!(expand_interface("Hun 2/0/51"), "HundredGigE2/0/51");
        assert_eq!(expand_interface("Po10"), "Port-channel10");
        assert_eq!(expand_interface("GigabitEthernet0/0"), "GigabitEthernet0/0");
        assert_eq!(expand_interface("Wlan-GigabitEthernet0"), "Wlan-GigabitEthernet0");
    }

    #[test]
    fn test_register_parsers() {
        let mut registry = ParserRegistry::new();
        register_parsers(&mut registry).unwrap();

        assert!(registry.lookup(NAME, "show vlan id 10").is_some());
        assert!(registry.lookup(NAME, "show ip int br").is_some());
        assert!(registry.lookup(NAME, "show cdp neighbors").is_some());
        assert!(registry.lookup(NAME, "show clock").is_none());
    }
}
