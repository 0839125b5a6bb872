//! Scripted in-memory device for driver and gateway tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use regex::bytes::Regex;

use netgate::channel::Shell;
use netgate::error::{ChannelError, Result, TransportError};
use netgate::transport::{Connector, DeviceTarget};

pub const HOSTNAME: &str = "csr1000v-1";

pub fn exec_prompt() -> String {
    format!("{HOSTNAME}>")
}

pub fn enable_prompt() -> String {
    format!("{HOSTNAME}#")
}

pub fn config_prompt(mode: &str) -> String {
    format!("{HOSTNAME}({mode})#")
}

/// What the device prints at login and after each input line.
///
/// Each login chunk and each reply arrives as one message, and reads see
/// one message at a time. Inputs without a scripted reply produce nothing,
/// so any read waiting on them fails with a pattern timeout straight away.
/// A stalled input leaves every later read pending forever.
#[derive(Debug, Clone, Default)]
pub struct Script {
    login: Vec<String>,
    replies: HashMap<String, String>,
    stalls: Vec<String>,
}

impl Script {
    /// An IOS-XE device already in privileged EXEC that accepts the
    /// on-open terminal commands and config mode changes.
    pub fn iosxe() -> Self {
        Self::default()
            .login(format!("\r\nWelcome to {HOSTNAME}\r\n\r\n{}", enable_prompt()))
            .reply("", format!("\r\n{}", enable_prompt()))
            .command("terminal length 0", "")
            .command("terminal width 512", "")
            .command_in(
                "configure terminal",
                "Enter configuration commands, one per line.  End with CNTL/Z.",
                &config_prompt("config"),
            )
            .command_in("end", "", &enable_prompt())
    }

    /// Same device, but logging in at user EXEC. `enable` asks for a
    /// password; the reply to the password itself is left to the test.
    pub fn iosxe_user_exec() -> Self {
        Self::iosxe()
            .login(format!("\r\n{}", exec_prompt()))
            .reply("", format!("\r\n{}", exec_prompt()))
            .command_in("terminal length 0", "", &exec_prompt())
            .command_in("terminal width 512", "", &exec_prompt())
            .reply("enable", "enable\r\nPassword: ")
    }

    /// Exact bytes printed once the shell opens, before any input.
    pub fn login(mut self, banner: impl Into<String>) -> Self {
        self.login = vec![banner.into()];
        self
    }

    /// Print nothing at login.
    pub fn without_login(mut self) -> Self {
        self.login.clear();
        self
    }

    /// A second privileged EXEC prompt, sent as its own message after login.
    pub fn extra_login_prompt(mut self) -> Self {
        self.login.push(format!("\r\n{}", enable_prompt()));
        self
    }

    /// After `input` is written the device goes quiet and reads never return.
    pub fn stall(mut self, input: &str) -> Self {
        self.stalls.push(input.to_string());
        self
    }

    /// Exact bytes printed after `input`.
    pub fn reply(mut self, input: &str, output: impl Into<String>) -> Self {
        self.replies.insert(input.to_string(), output.into());
        self
    }

    /// Echo, `body`, then the privileged EXEC prompt.
    pub fn command(self, input: &str, body: &str) -> Self {
        self.command_in(input, body, &enable_prompt())
    }

    /// Echo, `body`, then `prompt`.
    pub fn command_in(self, input: &str, body: &str, prompt: &str) -> Self {
        let body = body.replace('\n', "\r\n");
        let output = if body.is_empty() {
            format!("{input}\r\n{prompt}")
        } else {
            format!("{input}\r\n{body}\r\n{prompt}")
        };
        self.reply(input, output)
    }

    /// Remove the reply for `input`.
    pub fn silence(mut self, input: &str) -> Self {
        self.replies.remove(input);
        self
    }
}

/// Everything the device saw.
#[derive(Debug, Default)]
pub struct Transcript {
    pub connects: usize,
    pub writes: Vec<String>,
    pub closes: usize,
    pub drops: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SharedTranscript(Arc<Mutex<Transcript>>);

impl SharedTranscript {
    pub fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    pub fn drops(&self) -> usize {
        self.lock().drops
    }

    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    pub fn wrote(&self, input: &str) -> bool {
        self.lock().writes.iter().any(|w| w == input)
    }
}

pub struct ScriptedShell {
    script: Script,
    pending: VecDeque<Vec<u8>>,
    buffer: Vec<u8>,
    transcript: SharedTranscript,
    stalled: bool,
    closed: bool,
}

impl ScriptedShell {
    pub fn new(script: Script, transcript: SharedTranscript) -> Self {
        Self {
            pending: script.login.iter().map(|chunk| chunk.as_bytes().to_vec()).collect(),
            buffer: vec![],
            script,
            transcript,
            stalled: false,
            closed: false,
        }
    }
}

impl Drop for ScriptedShell {
    fn drop(&mut self) {
        self.transcript.lock().drops += 1;
    }
}

impl Shell for ScriptedShell {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        let input = String::from_utf8_lossy(data).trim_end_matches('\n').to_string();
        if let Some(reply) = self.script.replies.get(&input) {
            self.pending.push_back(reply.as_bytes().to_vec());
        }
        if self.script.stalls.contains(&input) {
            self.stalled = true;
        }
        self.transcript.lock().writes.push(input);
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Bytes> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        loop {
            if let Some(m) = pattern.find(&self.buffer) {
                let rest = self.buffer.split_off(m.end());
                return Ok(Bytes::from(std::mem::replace(&mut self.buffer, rest)));
            }
            match self.pending.pop_front() {
                Some(chunk) => self.buffer.extend_from_slice(&chunk),
                None => {
                    return Err(ChannelError::PatternTimeout {
                        pattern: pattern.as_str().to_string(),
                        timeout,
                    }
                    .into());
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.transcript.lock().closes += 1;
        }
        Ok(())
    }
}

/// Hands out scripted shells, or refuses the login.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    pub script: Script,
    pub transcript: SharedTranscript,
    pub refuse_login: bool,
}

impl ScriptedConnector {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            transcript: SharedTranscript::default(),
            refuse_login: false,
        }
    }

    pub fn refusing_login() -> Self {
        Self {
            refuse_login: true,
            ..Self::new(Script::iosxe())
        }
    }
}

impl Connector for ScriptedConnector {
    type Shell = ScriptedShell;

    async fn connect(&self, target: &DeviceTarget) -> Result<ScriptedShell> {
        self.transcript.lock().connects += 1;
        if self.refuse_login {
            return Err(TransportError::AuthenticationFailed {
                user: target.username.clone(),
            }
            .into());
        }
        Ok(ScriptedShell::new(self.script.clone(), self.transcript.clone()))
    }
}

pub fn target() -> DeviceTarget {
    DeviceTarget::new("10.0.0.1", "admin", "secret")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
