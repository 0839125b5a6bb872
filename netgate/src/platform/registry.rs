//! Platform lookup by name.

use std::collections::BTreeMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::definition::PlatformDefinition;
use super::vendors;
use crate::error::{PlatformError, Result};

static GLOBAL: Lazy<RwLock<PlatformRegistry>> = Lazy::new(|| RwLock::new(PlatformRegistry::builtin()));

/// Named platform definitions.
///
/// A process-wide instance, preloaded with the built-in platforms, backs
/// [`lookup`](Self::lookup) and [`register_global`](Self::register_global).
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in platforms.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let iosxe = vendors::cisco_iosxe::platform();
        registry.platforms.insert(iosxe.name.clone(), iosxe);
        registry
    }

    /// Clone a platform out of the process-wide registry.
    pub fn lookup(name: &str) -> Result<PlatformDefinition> {
        let registry = GLOBAL.read().map_err(|_| PlatformError::InvalidDefinition {
            message: "platform registry lock poisoned".to_string(),
        })?;
        registry.get(name).cloned().ok_or_else(|| {
            PlatformError::UnknownPlatform {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Add a platform to the process-wide registry.
    pub fn register_global(platform: PlatformDefinition) -> Result<()> {
        let mut registry = GLOBAL.write().map_err(|_| PlatformError::InvalidDefinition {
            message: "platform registry lock poisoned".to_string(),
        })?;
        registry.register(platform)
    }

    /// Validate and add a platform. Names are unique.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        if self.platforms.contains_key(&platform.name) {
            return Err(PlatformError::AlreadyRegistered {
                name: platform.name,
            }
            .into());
        }
        platform.validate()?;
        self.platforms.insert(platform.name.clone(), platform);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PlatformDefinition> {
        self.platforms.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PrivilegeLevel;

    #[test]
    fn test_builtin_lookup() {
        let platform = PlatformRegistry::lookup("cisco_iosxe").unwrap();
        assert_eq!(platform.name, "cisco_iosxe");
        assert!(platform.validate().is_ok());
    }

    #[test]
    fn test_unknown_platform() {
        let err = PlatformRegistry::lookup("commodore_64").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Platform error: Unknown platform 'commodore_64'"
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = PlatformRegistry::builtin();
        registry.register(PlatformDefinition::new("lab_switch")).unwrap();

        assert!(registry.register(PlatformDefinition::new("lab_switch")).is_err());
        assert_eq!(registry.names().collect::<Vec<_>>(), ["cisco_iosxe", "lab_switch"]);
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let mut registry = PlatformRegistry::new();
        let broken = PlatformDefinition::new("broken")
            .with_level(PrivilegeLevel::new("user", r">\s?$").unwrap())
            .with_default_privilege("enable");

        assert!(registry.register(broken).is_err());
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn test_register_global() {
        let platform = PlatformDefinition::new("registry_test_device")
            .with_level(PrivilegeLevel::new("shell", r"\$\s?$").unwrap())
            .with_default_privilege("shell");
        PlatformRegistry::register_global(platform).unwrap();

        let found = PlatformRegistry::lookup("registry_test_device").unwrap();
        assert_eq!(found.default_privilege, "shell");
    }
}
