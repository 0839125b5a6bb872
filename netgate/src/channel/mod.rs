//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive session plumbing: prompt-pattern
//! reads, ANSI stripping, and the [`Shell`] trait the driver is written
//! against.

mod buffer;
pub mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::PtyChannel;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use regex::bytes::Regex;

use crate::error::Result;

/// An interactive remote shell.
///
/// One exchange at a time: every method takes `&mut self`.
pub trait Shell: Send {
    /// Write raw bytes to the shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Read until `pattern` matches the tail of the output.
    ///
    /// Returns everything read up to and including the match. Fails with
    /// [`ChannelError::PatternTimeout`](crate::error::ChannelError::PatternTimeout)
    /// when `timeout` passes first.
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<Bytes>> + Send;

    /// Release the remote session. Calling it twice is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
