//! Platform definitions: the privilege graph and session conventions of one
//! device family.

use indexmap::IndexMap;

use super::privilege_level::PrivilegeLevel;
use crate::error::{PlatformError, Result};

/// Everything the driver needs to know about a device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Registry key, e.g. `cisco_iosxe`.
    pub name: String,

    /// Levels in declaration order. Prompts are classified against them in
    /// this order.
    pub levels: IndexMap<String, PrivilegeLevel>,

    /// Level a freshly opened session is moved to.
    pub default_privilege: String,

    /// Level configuration lines are sent from.
    pub config_privilege: String,

    /// Output substrings that mean the device rejected a command.
    pub failure_markers: Vec<String>,

    /// Sent once after login, e.g. to disable paging.
    pub on_open: Vec<String>,

    /// Sent before the session is released.
    pub on_close: Vec<String>,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: IndexMap::new(),
            default_privilege: String::new(),
            config_privilege: String::new(),
            failure_markers: vec![],
            on_open: vec![],
            on_close: vec![],
        }
    }

    pub fn with_level(mut self, level: PrivilegeLevel) -> Self {
        self.levels.insert(level.name.clone(), level);
        self
    }

    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    pub fn with_config_privilege(mut self, name: impl Into<String>) -> Self {
        self.config_privilege = name.into();
        self
    }

    pub fn with_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.failure_markers.push(marker.into());
        self
    }

    pub fn with_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open.push(command.into());
        self
    }

    pub fn with_close_command(mut self, command: impl Into<String>) -> Self {
        self.on_close.push(command.into());
        self
    }

    /// Get a privilege level by name.
    pub fn level(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// Check that every level name the definition refers to exists.
    ///
    /// Empty `default_privilege` or `config_privilege` means "not used".
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| PlatformError::InvalidDefinition { message };

        for level in self.levels.values() {
            if let Some(parent) = &level.parent {
                if !self.levels.contains_key(parent) {
                    return Err(invalid(format!(
                        "{}: level '{}' has unknown parent '{}'",
                        self.name, level.name, parent
                    ))
                    .into());
                }
                if level.enter_command.is_none() || level.exit_command.is_none() {
                    return Err(invalid(format!(
                        "{}: level '{}' needs both enter and exit commands",
                        self.name, level.name
                    ))
                    .into());
                }
            }
        }

        for (role, name) in [
            ("default", &self.default_privilege),
            ("config", &self.config_privilege),
        ] {
            if !name.is_empty() && !self.levels.contains_key(name) {
                return Err(invalid(format!(
                    "{}: {} privilege '{}' is not defined",
                    self.name, role, name
                ))
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_levels() -> PlatformDefinition {
        PlatformDefinition::new("lab_switch")
            .with_level(PrivilegeLevel::new("user", r">\s?$").unwrap())
            .with_level(
                PrivilegeLevel::new("admin", r"#\s?$")
                    .unwrap()
                    .child_of("user")
                    .entered_with("enable")
                    .left_with("disable"),
            )
            .with_default_privilege("admin")
    }

    #[test]
    fn test_valid_definition() {
        assert!(two_levels().validate().is_ok());
    }

    #[test]
    fn test_unknown_parent() {
        let definition = two_levels().with_level(
            PrivilegeLevel::new("config", r"\(config\)#\s?$")
                .unwrap()
                .child_of("admin_exec")
                .entered_with("configure terminal")
                .left_with("end"),
        );
        let err = definition.validate().unwrap_err();
        assert!(err.to_string().contains("unknown parent 'admin_exec'"));
    }

    #[test]
    fn test_child_without_commands() {
        let definition = two_levels()
            .with_level(PrivilegeLevel::new("config", r"\(config\)#\s?$").unwrap().child_of("admin"));
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_missing_config_privilege() {
        let err = two_levels()
            .with_config_privilege("configuration")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("config privilege 'configuration'"));
    }
}
