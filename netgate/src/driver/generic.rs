//! Generic driver implementation that works with any platform.

use std::time::{Duration, Instant};

use log::{debug, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::failure::find_failure;
use super::interactive::{HIDDEN_INPUT, InteractiveStep};
use super::privilege::PrivilegeManager;
use super::response::CommandResult;
use crate::channel::Shell;
use crate::channel::patterns::{combined_prompt_pattern, literal_pattern};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;

/// Drives one interactive shell according to a platform definition.
///
/// Handles:
/// - prompt detection across all privilege levels
/// - command echo and trailing prompt removal
/// - privilege navigation, including the enable password
/// - failure detection against the platform's markers
///
/// Every operation takes `&mut self`, so at most one exchange is in flight.
pub struct GenericDriver<S> {
    shell: S,
    platform: PlatformDefinition,
    privileges: PrivilegeManager,
    prompt_pattern: Regex,
    timeout: Duration,
    auth_secondary: Option<SecretString>,
    failed_when_contains: Vec<String>,
    closed: bool,
}

impl<S: Shell> GenericDriver<S> {
    /// Wrap an authenticated shell.
    pub fn new(shell: S, platform: PlatformDefinition) -> Result<Self> {
        let prompt_pattern = combined_prompt_pattern(platform.levels.values())
            .map_err(ChannelError::from)?;

        Ok(Self {
            shell,
            privileges: PrivilegeManager::new(platform.levels.clone()),
            failed_when_contains: platform.failure_markers.clone(),
            platform,
            prompt_pattern,
            timeout: Duration::from_secs(30),
            auth_secondary: None,
            closed: false,
        })
    }

    /// Set the wait for each prompt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the password sent when escalation asks for one.
    pub fn with_auth_secondary(mut self, secret: SecretString) -> Self {
        self.auth_secondary = Some(secret);
        self
    }

    /// Replace the platform's failure markers.
    pub fn with_failure_markers(mut self, markers: Vec<String>) -> Self {
        self.failed_when_contains = markers;
        self
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Name of the current privilege level, if known.
    pub fn current_privilege(&self) -> Option<&str> {
        self.privileges.current()
    }

    /// Combined prompt pattern of all privilege levels.
    pub fn prompt_pattern(&self) -> &Regex {
        &self.prompt_pattern
    }

    /// Failure markers in effect.
    pub fn failure_markers(&self) -> &[String] {
        &self.failed_when_contains
    }

    /// Whether `close()` has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Prepare the session: wait for the login prompt, run on-open commands
    /// and move to the default privilege level.
    ///
    /// Nothing is written until the device has shown its first prompt.
    pub async fn open(&mut self) -> Result<()> {
        self.ensure_not_closed()?;
        let (_, prompt) = self.read_prompt().await?;
        self.privileges.observe_prompt(&prompt);
        debug!("{}: initial prompt '{}'", self.platform.name, prompt);

        for command in self.platform.on_open.clone() {
            self.send_command(&command).await?;
        }

        let default = self.platform.default_privilege.clone();
        if !default.is_empty() {
            self.acquire_privilege(&default).await?;
        }
        Ok(())
    }

    /// Send a newline and return the prompt that comes back.
    pub async fn get_prompt(&mut self) -> Result<String> {
        self.ensure_not_closed()?;
        self.shell.write(b"\n").await?;
        let (_, prompt) = self.read_prompt().await?;
        self.privileges.observe_prompt(&prompt);
        Ok(prompt)
    }

    /// Send one command and wait for the prompt.
    ///
    /// A command the device rejects is returned as a failed
    /// [`CommandResult`], not as an error.
    pub async fn send_command(&mut self, command: &str) -> Result<CommandResult> {
        self.ensure_not_closed()?;
        debug!("{}: sending '{}'", self.platform.name, command);

        let start = Instant::now();
        self.send_line(command).await?;
        let (body, prompt) = self.read_prompt().await?;
        self.privileges.observe_prompt(&prompt);

        let output = body.trim_start_matches('\n').trim_end().to_string();
        Ok(self.build_result(command, output, prompt, start.elapsed()))
    }

    /// Send configuration lines from the configuration privilege level.
    ///
    /// Blank lines are skipped. With `stop_on_failed` the first rejected
    /// line ends the batch. The driver returns to the privilege level it
    /// started from before the combined result is returned.
    pub async fn send_config(&mut self, lines: &[&str], stop_on_failed: bool) -> Result<CommandResult> {
        let lines: Vec<&str> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        let restore = self
            .privileges
            .current()
            .map(str::to_string)
            .unwrap_or_else(|| self.platform.default_privilege.clone());
        let config_privilege = self.platform.config_privilege.clone();
        self.acquire_privilege(&config_privilege).await?;

        let mut results = Vec::with_capacity(lines.len());
        for line in &lines {
            let result = self.send_command(line).await?;
            let failed = result.failed();
            results.push(result);
            if failed && stop_on_failed {
                debug!("{}: stopping config at rejected line '{}'", self.platform.name, line);
                break;
            }
        }

        self.acquire_privilege(&restore).await?;
        Ok(CommandResult::combine(lines.join("\n"), &results))
    }

    /// Run an interactive flow, optionally from a given privilege level.
    ///
    /// Steps run strictly in order. If a step's expectation does not show up
    /// within its timeout the flow stops with
    /// [`ChannelError::PatternTimeout`] and later steps are never sent.
    pub async fn send_interactive(
        &mut self,
        steps: &[InteractiveStep],
        privilege: Option<&str>,
    ) -> Result<CommandResult> {
        self.ensure_not_closed()?;
        if let Some(privilege) = privilege {
            self.acquire_privilege(privilege).await?;
        }

        let start = Instant::now();
        let mut output = String::new();

        for (index, step) in steps.iter().enumerate() {
            debug!(
                "{}: step {}: sending '{}', expecting '{}'",
                self.platform.name,
                index + 1,
                step.display_input(),
                step.expect
            );
            let expect = literal_pattern(&step.expect).map_err(ChannelError::from)?;
            self.shell.write(format!("{}\n", step.input).as_bytes()).await?;

            let data = self
                .shell
                .read_until(&expect, step.timeout.unwrap_or(self.timeout))
                .await?;
            output.push_str(&String::from_utf8_lossy(&data).replace('\r', ""));
        }

        for step in steps.iter().filter(|step| step.hidden && !step.input.is_empty()) {
            output = output.replace(&step.input, HIDDEN_INPUT);
        }

        let prompt = output.lines().last().unwrap_or_default().trim().to_string();
        if let Some(level) = self.privileges.observe_prompt(&prompt) {
            debug!("{}: interactive flow ended in '{}'", self.platform.name, level);
        }

        let command = steps
            .iter()
            .map(InteractiveStep::display_input)
            .collect::<Vec<_>>()
            .join("\n");
        let output = output.trim_end().to_string();
        Ok(self.build_result(&command, output, prompt, start.elapsed()))
    }

    /// Move to privilege level `target`, one hop at a time.
    pub async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        self.ensure_not_closed()?;

        let current = match self.privileges.current() {
            Some(current) => current.to_string(),
            None => {
                let prompt = self.get_prompt().await?;
                self.privileges
                    .current()
                    .map(str::to_string)
                    .ok_or(DriverError::UnknownPrivilege { prompt })?
            }
        };
        if current == target {
            return Ok(());
        }

        for hop in self.privileges.plan(&current, target)? {
            debug!(
                "{}: '{}' to reach '{}'",
                self.platform.name, hop.command, hop.target
            );
            self.send_line(&hop.command).await?;

            let prompt = match hop.auth_prompt {
                Some(ref auth) => self.answer_auth(auth, &hop.target).await?,
                None => self.read_prompt().await?.1,
            };

            if self.privileges.observe_prompt(&prompt) != Some(hop.target.as_str()) {
                return Err(DriverError::PrivilegeAcquisitionFailed { target: hop.target }.into());
            }
        }
        Ok(())
    }

    /// Run on-close commands and release the shell. Safe to call twice.
    ///
    /// On-close commands are best effort; the shell is closed regardless.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        for command in &self.platform.on_close {
            if let Err(e) = self.shell.write(format!("{command}\n").as_bytes()).await {
                debug!("{}: on-close '{}': {}", self.platform.name, command, e);
                break;
            }
        }
        self.shell.close().await
    }

    async fn answer_auth(&mut self, auth: &Regex, target: &str) -> Result<String> {
        let either = Regex::new(&format!(
            "(?:{})|(?:{})",
            auth.as_str(),
            self.prompt_pattern.as_str()
        ))
        .map_err(ChannelError::from)?;

        let data = self.shell.read_until(&either, self.timeout).await?;
        if !auth.is_match(&data) {
            return Ok(self.split_prompt(&data).1);
        }

        let Some(ref secret) = self.auth_secondary else {
            warn!(
                "{}: '{}' asks for a password but none is configured",
                self.platform.name, target
            );
            return Err(DriverError::PrivilegeAcquisitionFailed {
                target: target.to_string(),
            }
            .into());
        };

        debug!("{}: sending {} password", self.platform.name, target);
        let line = format!("{}\n", secret.expose_secret());
        self.shell.write(line.as_bytes()).await?;
        Ok(self.read_prompt().await?.1)
    }

    /// Write `line` and consume output up to and including its echo.
    ///
    /// Output the device sent before the echo, such as a stray prompt, is
    /// discarded.
    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.shell.write(format!("{line}\n").as_bytes()).await?;

        let echo = line.trim();
        if echo.is_empty() {
            return Ok(());
        }
        let pattern = literal_pattern(echo).map_err(ChannelError::from)?;
        let data = self.shell.read_until(&pattern, self.timeout).await?;
        let stale = &data[..data.len().saturating_sub(echo.len())];
        if stale.iter().any(|b| !b.is_ascii_whitespace()) {
            debug!(
                "{}: discarded {} bytes ahead of '{}'",
                self.platform.name,
                stale.len(),
                echo
            );
        }
        Ok(())
    }

    async fn read_prompt(&mut self) -> Result<(String, String)> {
        let data = self.shell.read_until(&self.prompt_pattern, self.timeout).await?;
        Ok(self.split_prompt(&data))
    }

    /// Split output into the text before the last prompt and the prompt.
    fn split_prompt(&self, data: &[u8]) -> (String, String) {
        let start = self
            .prompt_pattern
            .find_iter(data)
            .last()
            .map_or(data.len(), |m| m.start());
        let (body, prompt) = data.split_at(start);
        (
            String::from_utf8_lossy(body).replace('\r', ""),
            String::from_utf8_lossy(prompt).trim().to_string(),
        )
    }

    fn build_result(&self, command: &str, output: String, prompt: String, elapsed: Duration) -> CommandResult {
        match find_failure(&output, &self.failed_when_contains) {
            Some(marker) => {
                debug!("{}: '{}' rejected ({})", self.platform.name, command, marker);
                CommandResult::rejected(command, output, prompt, elapsed)
            }
            None => CommandResult::new(command, output, prompt, elapsed),
        }
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed {
            return Err(DriverError::Closed.into());
        }
        Ok(())
    }
}
