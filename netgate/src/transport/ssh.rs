//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, warn};
use regex::bytes::Regex;
use russh::client::{self, Handle};
use russh::keys::PublicKey;
use secrecy::ExposeSecret;

use super::config::{HostKeyVerification, SshConfig};
use crate::channel::{PtyChannel, Shell};
use crate::error::{ChannelError, Result, TransportError};

/// SSH transport wrapping a russh client session.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Terminal size requested for PTY channels.
    terminal: (u32, u32),
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    ///
    /// TCP connect, key exchange and authentication share one
    /// `config.timeout` budget.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        tokio::time::timeout(config.timeout, Self::connect_inner(config))
            .await
            .map_err(|_| TransportError::Timeout(config.timeout))?
    }

    async fn connect_inner(config: &SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.inactivity_timeout()),
            ..Default::default()
        });

        if config.host_key_verification == HostKeyVerification::Disabled {
            warn!(
                "host key verification disabled for {}, accepting any key",
                config.socket_addr()
            );
        }

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        let mut session = client::connect(ssh_config, (config.host.as_str(), config.port), handler)
            .await
            .map_err(|e| {
                // If check_server_key stored a detailed error, use that instead
                // of the generic russh::Error::UnknownKey
                let stored = host_key_error.lock().ok().and_then(|mut slot| slot.take());
                match (stored, e) {
                    (Some(hk_err), _) => hk_err,
                    (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                        host: config.host.clone(),
                        port: config.port,
                        source,
                    },
                    (None, e) => TransportError::Ssh(e),
                }
            })?;
        debug!("{} handshake complete", config.socket_addr());

        let auth = session
            .authenticate_password(&config.username, config.password.expose_secret())
            .await
            .map_err(TransportError::Ssh)?;

        if !auth.success() {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }
        debug!("{} authenticated as {}", config.socket_addr(), config.username);

        Ok(Self {
            session,
            terminal: (config.terminal_width, config.terminal_height),
        })
    }

    /// Open a new PTY channel running the login shell.
    pub async fn open_channel(&self, search_depth: usize) -> Result<PtyChannel> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(ChannelError::PtyOpenFailed)?;

        let (width, height) = self.terminal;
        channel
            .request_pty(true, "xterm", width, height, 0, 0, &[])
            .await
            .map_err(ChannelError::PtyOpenFailed)?;

        channel
            .request_shell(true)
            .await
            .map_err(ChannelError::PtyOpenFailed)?;

        Ok(PtyChannel::new(channel, search_depth))
    }

    /// Check if the underlying session has ended.
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        if self.session.is_closed() {
            return Ok(());
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Interactive shell over SSH: one transport plus its PTY channel.
///
/// Dropping an `SshShell` that was not closed (for example because the
/// future driving it was cancelled) still disconnects the SSH session on
/// the current tokio runtime.
pub struct SshShell {
    transport: Option<SshTransport>,
    channel: PtyChannel,
    addr: String,
}

impl SshShell {
    /// Connect, authenticate and start a shell.
    pub async fn open(config: &SshConfig, search_depth: usize) -> Result<Self> {
        let transport = SshTransport::connect(config).await?;
        let channel = match transport.open_channel(search_depth).await {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    warn!("{}: close after failed shell request: {}", config.socket_addr(), close_err);
                }
                return Err(e);
            }
        };

        Ok(Self {
            transport: Some(transport),
            channel,
            addr: config.socket_addr(),
        })
    }
}

impl Shell for SshShell {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        match self.transport {
            Some(ref transport) if !transport.is_closed() => self.channel.write(data).await,
            _ => Err(TransportError::Disconnected.into()),
        }
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Bytes> {
        self.channel.read_until_pattern(pattern, timeout).await
    }

    async fn close(&mut self) -> Result<()> {
        let Some(transport) = self.transport.take() else {
            return Ok(());
        };

        if let Err(e) = self.channel.close().await {
            debug!("{}: channel close: {}", self.addr, e);
        }
        transport.close().await?;
        debug!("{} session closed", self.addr);
        Ok(())
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        let Some(transport) = self.transport.take() else {
            return;
        };

        warn!("{}: shell dropped without close, disconnecting", self.addr);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let addr = std::mem::take(&mut self.addr);
                runtime.spawn(async move {
                    if let Err(e) = transport.close().await {
                        debug!("{}: disconnect after drop: {}", addr, e);
                    }
                });
            }
            // Without a runtime the handle is dropped, which ends the
            // session task on its own.
            Err(_) => drop(transport),
        }
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key error so connect() can surface it
    /// instead of the generic russh::Error::UnknownKey.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(TransportError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, TransportError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    fn reject(&self, err: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(err);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => Ok(self.reject(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                })),
                Err(e) => Ok(self.reject(e)),
            },
        }
    }
}
