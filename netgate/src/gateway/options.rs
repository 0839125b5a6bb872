//! Gateway tuning.

use std::time::Duration;

use crate::platform::vendors::cisco_iosxe;

/// Timeouts, terminal geometry and platform selection for a [`Gateway`](super::Gateway).
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Registered platform name.
    pub platform: String,

    /// Bound on TCP connect, handshake and authentication.
    pub connect_timeout: Duration,

    /// Bound on each prompt or interactive-step wait.
    pub operation_timeout: Duration,

    /// Trailing bytes searched for a prompt.
    pub search_depth: usize,

    pub terminal_width: u32,
    pub terminal_height: u32,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            platform: cisco_iosxe::NAME.to_string(),
            connect_timeout: Duration::from_secs(15),
            operation_timeout: Duration::from_secs(30),
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

impl GatewayOptions {
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }
}
