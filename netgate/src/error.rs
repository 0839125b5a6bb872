//! Error types for netgate.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netgate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Output normalization errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Whether this error means a bounded wait ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::Timeout(_))
                | Error::Channel(ChannelError::PatternTimeout { .. })
        )
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host is not present in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel: {0}")]
    PtyOpenFailed(russh::Error),

    /// Expected output did not arrive in time
    #[error("Pattern '{pattern}' not found within {timeout:?}")]
    PatternTimeout { pattern: String, timeout: Duration },

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Session already closed
    #[error("Session is closed")]
    Closed,

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// No platform registered under this name
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// A platform with this name is already registered
    #[error("Platform '{name}' is already registered")]
    AlreadyRegistered { name: String },
}

/// Output normalization errors.
///
/// Only raised while building parsers and templates. Parsing device output
/// itself never fails; it produces empty structure instead.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Template source could not be compiled
    #[error("Invalid template: {message}")]
    InvalidTemplate { message: String },

    /// Command pattern could not be compiled
    #[error("Invalid command pattern '{pattern}': {source}")]
    InvalidCommandPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors crossing the gateway boundary.
///
/// The session has already been closed when either is returned.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The session could not be opened: unreachable host, refused
    /// credentials, or no usable prompt after login
    #[error("Could not open a session to {host}: {source}")]
    Authentication {
        host: String,
        #[source]
        source: Error,
    },

    /// The session was open but expected output never arrived
    #[error("No response from {host}: {source}")]
    TransportTimeout {
        host: String,
        #[source]
        source: Error,
    },
}

impl GatewayError {
    /// Host the failed call was made against.
    pub fn host(&self) -> &str {
        match self {
            GatewayError::Authentication { host, .. } | GatewayError::TransportTimeout { host, .. } => host,
        }
    }

    /// The underlying error.
    pub fn cause(&self) -> &Error {
        match self {
            GatewayError::Authentication { source, .. }
            | GatewayError::TransportTimeout { source, .. } => source,
        }
    }
}

/// Result type alias using netgate's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err: Error = ChannelError::PatternTimeout {
            pattern: "#".to_string(),
            timeout: Duration::from_secs(1),
        }
        .into();
        assert!(err.is_timeout());

        let err: Error = TransportError::Timeout(Duration::from_secs(5)).into();
        assert!(err.is_timeout());

        let err: Error = ChannelError::Closed.into();
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_display_includes_user() {
        let err: Error = TransportError::AuthenticationFailed {
            user: "admin".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Transport error: Authentication failed for user 'admin'"
        );
    }

    #[test]
    fn test_gateway_error_keeps_cause() {
        let err = GatewayError::Authentication {
            host: "10.0.0.1".to_string(),
            source: TransportError::AuthenticationFailed {
                user: "admin".to_string(),
            }
            .into(),
        };
        assert_eq!(err.host(), "10.0.0.1");
        assert!(!err.cause().is_timeout());
        assert!(err.to_string().starts_with("Could not open a session to 10.0.0.1"));
    }
}
