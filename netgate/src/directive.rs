//! Structured configuration inputs rendered to CLI directive lines.

use serde::{Deserialize, Serialize};

/// A structured change that renders to configuration lines.
pub trait ConfigDirective {
    /// Directive lines in the order they must be sent.
    fn directives(&self) -> Vec<String>;

    /// Directive lines joined with newlines.
    fn render(&self) -> String {
        self.directives().join("\n")
    }
}

/// Interface settings. Unset and empty fields render nothing.
///
/// Lines come out as identity, IP address, description, then admin state:
///
/// ```rust
/// use netgate::directive::{ConfigDirective, InterfaceConfig};
///
/// let change = InterfaceConfig::new("gi0/0").description("uplink").enabled(false);
/// assert_eq!(change.render(), "interface gi0/0\ndescription uplink\nshutdown");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl InterfaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn ip_address(mut self, address: impl Into<String>) -> Self {
        self.ip_address = Some(address.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

impl ConfigDirective for InterfaceConfig {
    fn directives(&self) -> Vec<String> {
        let set = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);

        let mut lines = vec![format!("interface {}", self.name)];
        if let Some(address) = set(&self.ip_address) {
            lines.push(format!("ip address {address}"));
        }
        if let Some(description) = set(&self.description) {
            lines.push(format!("description {description}"));
        }
        match self.enabled {
            Some(true) => lines.push("no shutdown".to_string()),
            Some(false) => lines.push("shutdown".to_string()),
            None => {}
        }
        lines
    }
}
