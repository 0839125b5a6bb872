//! Device credentials and connection settings from the environment.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use netgate::{DeviceTarget, GatewayOptions};

use crate::error::{ApiError, Result};

/// Credential variable pairs, most specific first.
///
/// The first pair with both halves set wins; pairs are never mixed.
pub const CREDENTIAL_SOURCES: [(&str, &str); 3] = [
    ("NETGATE_USERNAME", "NETGATE_PASSWORD"),
    ("IOS_USERNAME", "IOS_PASSWORD"),
    ("USERNAME", "PASSWORD"),
];

/// Settings shared by every request the API serves.
#[derive(Debug)]
pub struct ApiConfig {
    pub username: String,

    /// Login password, also sent when the device asks for an enable secret.
    pub password: SecretString,

    /// Platform name (`NETGATE_PLATFORM`).
    pub platform: String,

    /// SSH port (`NETGATE_PORT`).
    pub port: u16,

    /// Require known host keys (`NETGATE_STRICT_HOST_KEY`).
    pub strict_host_key_checking: bool,

    /// Per-operation timeout override (`NETGATE_TIMEOUT_SECS`).
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let (username, password) = CREDENTIAL_SOURCES
            .iter()
            .find_map(|(user, pass)| Some((get(user)?, get(pass)?)))
            .ok_or(ApiError::MissingCredentials)?;

        let port = match get("NETGATE_PORT") {
            Some(value) => value.parse().map_err(|_| ApiError::InvalidSetting {
                name: "NETGATE_PORT",
                value,
            })?,
            None => 22,
        };

        let timeout = match get("NETGATE_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ApiError::InvalidSetting {
                        name: "NETGATE_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => None,
        };

        let strict_host_key_checking = get("NETGATE_STRICT_HOST_KEY")
            .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "true" | "1"));

        Ok(Self {
            username,
            password: SecretString::from(password),
            platform: get("NETGATE_PLATFORM").unwrap_or_else(|| GatewayOptions::default().platform),
            port,
            strict_host_key_checking,
            timeout,
        })
    }

    /// Gateway options for these settings.
    pub fn gateway_options(&self) -> GatewayOptions {
        let options = GatewayOptions::default().platform(&self.platform);
        match self.timeout {
            Some(timeout) => options.operation_timeout(timeout),
            None => options,
        }
    }

    /// A fresh target for `host` carrying these credentials.
    pub fn target(&self, host: &str) -> DeviceTarget {
        DeviceTarget::new(host, &self.username, self.password.expose_secret())
            .with_port(self.port)
            .with_strict_host_key_checking(self.strict_host_key_checking)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_netgate_credentials_win() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("NETGATE_USERNAME", "netops"),
            ("NETGATE_PASSWORD", "n3t"),
            ("USERNAME", "desktop-user"),
            ("PASSWORD", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.username, "netops");
        assert_eq!(config.password.expose_secret(), "n3t");
    }

    #[test]
    fn test_falls_back_to_ios_then_generic_pair() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("IOS_USERNAME", "cisco"),
            ("IOS_PASSWORD", "cisco123"),
            ("USERNAME", "desktop-user"),
            ("PASSWORD", "hunter2"),
        ]))
        .unwrap();
        assert_eq!(config.username, "cisco");

        let config =
            ApiConfig::from_lookup(lookup(&[("USERNAME", "admin"), ("PASSWORD", "secret")])).unwrap();
        assert_eq!(config.username, "admin");
    }

    #[test]
    fn test_pairs_are_not_mixed() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("NETGATE_USERNAME", "netops"),
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.username, "admin");
    }

    #[test]
    fn test_missing_credentials() {
        let err = ApiConfig::from_lookup(lookup(&[("USERNAME", "admin"), ("PASSWORD", "")])).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials));
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_lookup(lookup(&[("USERNAME", "admin"), ("PASSWORD", "secret")])).unwrap();

        assert_eq!(config.platform, "cisco_iosxe");
        assert_eq!(config.port, 22);
        assert!(!config.strict_host_key_checking);
        assert_eq!(config.gateway_options().operation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_connection_settings() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
            ("NETGATE_PORT", "2222"),
            ("NETGATE_STRICT_HOST_KEY", "TRUE"),
            ("NETGATE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.gateway_options().operation_timeout, Duration::from_secs(5));

        let target = config.target("10.0.0.1");
        assert_eq!(target.host, "10.0.0.1");
        assert_eq!(target.port, 2222);
        assert!(target.strict_host_key_checking);
        assert_eq!(target.secret.expose_secret(), "secret");
    }

    #[test]
    fn test_invalid_settings() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
            ("NETGATE_PORT", "ssh"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidSetting { name: "NETGATE_PORT", .. }));

        let err = ApiConfig::from_lookup(lookup(&[
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
            ("NETGATE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidSetting { name: "NETGATE_TIMEOUT_SECS", .. }));
    }
}
