//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept all keys without checking. Every connection made this way
    /// logs a warning.
    #[default]
    Disabled,
}

/// A single remote device and the credentials to reach it.
///
/// Built per request and never cached.
#[derive(Debug)]
pub struct DeviceTarget {
    /// Hostname or IP address.
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Login username.
    pub username: String,

    /// Login password, also used as the enable secret.
    pub secret: SecretString,

    /// Require the host key to be present in known_hosts.
    pub strict_host_key_checking: bool,

    /// Alternate known_hosts file for strict checking.
    pub known_hosts_path: Option<PathBuf>,
}

impl DeviceTarget {
    /// Create a target on port 22 with host key checking disabled.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            secret: SecretString::from(secret.into()),
            strict_host_key_checking: false,
            known_hosts_path: None,
        }
    }

    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable strict host key checking.
    pub fn with_strict_host_key_checking(mut self, strict: bool) -> Self {
        self.strict_host_key_checking = strict;
        self
    }

    /// Check host keys against this known_hosts file instead of `~/.ssh/known_hosts`.
    pub fn with_known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Host key verification mode for this target.
    pub fn host_key_verification(&self) -> HostKeyVerification {
        if self.strict_host_key_checking {
            HostKeyVerification::Strict
        } else {
            HostKeyVerification::Disabled
        }
    }
}

const MIN_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);

/// SSH connection configuration.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: SecretString,

    /// Bound on TCP connect, handshake and authentication together.
    pub timeout: Duration,

    /// Longest single read the driver waits for once the shell is open.
    pub operation_timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Build a password-authenticated config for a device target.
    pub fn for_target(target: &DeviceTarget, timeout: Duration) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            username: target.username.clone(),
            password: SecretString::from(target.secret.expose_secret().to_owned()),
            timeout,
            operation_timeout: timeout,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: target.host_key_verification(),
            known_hosts_path: target.known_hosts_path.clone(),
        }
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the longest single read the driver will wait for.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Idle bound for the session: never shorter than either timeout
    /// nor one minute, so a slow command is not cut off mid-read.
    pub fn inactivity_timeout(&self) -> Duration {
        self.timeout
            .max(self.operation_timeout)
            .max(MIN_INACTIVITY_TIMEOUT)
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let target = DeviceTarget::new("10.0.0.1", "admin", "secret");
        assert_eq!(target.port, 22);
        assert!(!target.strict_host_key_checking);
        assert_eq!(target.host_key_verification(), HostKeyVerification::Disabled);
    }

    #[test]
    fn test_strict_checking_maps_to_strict_mode() {
        let target = DeviceTarget::new("10.0.0.1", "admin", "secret")
            .with_strict_host_key_checking(true);
        assert_eq!(target.host_key_verification(), HostKeyVerification::Strict);
    }

    #[test]
    fn test_config_for_target() {
        let target = DeviceTarget::new("sw1", "admin", "secret").with_port(2222);
        let config = SshConfig::for_target(&target, Duration::from_secs(5));
        assert_eq!(config.socket_addr(), "sw1:2222");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password.expose_secret(), "secret");
    }

    #[test]
    fn test_inactivity_covers_slow_operations() {
        let target = DeviceTarget::new("sw1", "admin", "secret");
        let config = SshConfig::for_target(&target, Duration::from_secs(10))
            .with_operation_timeout(Duration::from_secs(300));
        assert_eq!(config.inactivity_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_inactivity_has_a_floor() {
        let target = DeviceTarget::new("sw1", "admin", "secret");
        let config = SshConfig::for_target(&target, Duration::from_secs(10))
            .with_operation_timeout(Duration::from_secs(30));
        assert_eq!(config.inactivity_timeout(), Duration::from_secs(60));

        let config = SshConfig::for_target(&target, Duration::from_secs(90));
        assert_eq!(config.inactivity_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn test_debug_hides_secret() {
        let target = DeviceTarget::new("sw1", "admin", "hunter2");
        assert!(!format!("{target:?}").contains("hunter2"));
    }
}
