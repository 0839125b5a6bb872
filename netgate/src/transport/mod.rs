//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management,
//! handling connection setup, authentication, and shell creation.

pub mod config;
mod ssh;

pub use config::{DeviceTarget, HostKeyVerification, SshConfig};
pub use ssh::{SshShell, SshTransport};

use std::future::Future;
use std::time::Duration;

use crate::channel::Shell;
use crate::error::Result;

/// Opens authenticated shells to device targets.
pub trait Connector: Send + Sync {
    /// The shell type produced by this connector.
    type Shell: Shell + 'static;

    /// Open an authenticated interactive shell to `target`.
    fn connect(&self, target: &DeviceTarget) -> impl Future<Output = Result<Self::Shell>> + Send;
}

/// Connector that opens real SSH sessions.
#[derive(Debug, Clone)]
pub struct SshConnector {
    timeout: Duration,
    operation_timeout: Duration,
    search_depth: usize,
    terminal_width: u32,
    terminal_height: u32,
}

impl SshConnector {
    /// Create a connector with the given connect/authenticate timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            operation_timeout: timeout,
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Set the longest single read the session must stay alive for.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set how many trailing bytes are searched for prompts.
    pub fn search_depth(mut self, search_depth: usize) -> Self {
        self.search_depth = search_depth;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

impl Connector for SshConnector {
    type Shell = SshShell;

    async fn connect(&self, target: &DeviceTarget) -> Result<SshShell> {
        let config = SshConfig::for_target(target, self.timeout)
            .with_operation_timeout(self.operation_timeout)
            .with_terminal_size(self.terminal_width, self.terminal_height);
        SshShell::open(&config, self.search_depth).await
    }
}
