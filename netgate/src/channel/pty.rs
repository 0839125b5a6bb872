//! PTY channel for interactive device sessions.

use std::time::Duration;

use bytes::Bytes;
use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Interactive shell channel with pattern-based reads.
///
/// Wraps an SSH session channel that already has a PTY and a shell, and
/// accumulates its output in a [`PatternBuffer`] until a prompt shows up.
pub struct PtyChannel {
    /// The russh channel carrying the shell.
    channel: Channel<Msg>,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,

    /// Whether the channel is open.
    is_open: bool,
}

impl PtyChannel {
    /// Wrap an open shell channel.
    pub fn new(channel: Channel<Msg>, search_depth: usize) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(search_depth),
            is_open: true,
        }
    }

    /// Check if the channel is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Write bytes to the remote shell.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_open {
            return Err(ChannelError::Closed.into());
        }
        self.channel.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the buffer tail.
    ///
    /// Returns all output up to and including the match; anything that
    /// arrived after the match stays buffered for the next read.
    pub async fn read_until_pattern(&mut self, pattern: &Regex, timeout: Duration) -> Result<Bytes> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some((_, end)) = self.buffer.search_tail(pattern) {
                return Ok(self.buffer.take_through(end));
            }

            if !self.is_open {
                return Err(ChannelError::Closed.into());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout {
                    pattern: pattern.as_str().to_string(),
                    timeout,
                })?;

            match msg {
                Some(ChannelMsg::Data { data }) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    self.is_open = false;
                }
                Some(other) => trace!("ignoring channel message {:?}", other),
            }
        }
    }

    /// Send EOF and close the channel.
    pub async fn close(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;
        self.channel.eof().await.map_err(ChannelError::Ssh)?;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
