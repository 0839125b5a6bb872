//! Outcome of one command exchange.

use std::time::Duration;

use serde::Serialize;

/// What the device printed for a command, and whether it rejected it.
///
/// `raw_text` is the device output with the command echo and the trailing
/// prompt removed. A rejected command carries that same text as its
/// `failure_reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    command: String,
    raw_text: String,
    prompt: String,
    #[serde(skip)]
    elapsed: Duration,
    failed: bool,
    failure_reason: Option<String>,
}

impl CommandResult {
    /// Create an accepted result.
    pub fn new(
        command: impl Into<String>,
        raw_text: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            raw_text: raw_text.into(),
            prompt: prompt.into(),
            elapsed,
            failed: false,
            failure_reason: None,
        }
    }

    /// Create a result the device rejected.
    pub fn rejected(
        command: impl Into<String>,
        raw_text: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        let raw_text = raw_text.into();
        Self {
            command: command.into(),
            failure_reason: Some(raw_text.clone()),
            raw_text,
            prompt: prompt.into(),
            elapsed,
            failed: true,
        }
    }

    /// Fold several exchanges into one result.
    ///
    /// Texts are joined with newlines, elapsed times are summed and the last
    /// prompt wins. The result is rejected if any part was.
    pub fn combine(command: impl Into<String>, parts: &[CommandResult]) -> Self {
        let raw_text = parts
            .iter()
            .map(|part| part.raw_text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = parts.last().map(|part| part.prompt.clone()).unwrap_or_default();
        let elapsed = parts.iter().map(|part| part.elapsed).sum();

        if parts.iter().any(CommandResult::failed) {
            Self::rejected(command, raw_text, prompt, elapsed)
        } else {
            Self::new(command, raw_text, prompt, elapsed)
        }
    }

    /// The command (or joined inputs) that was sent.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Device output without echo and trailing prompt.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Prompt seen after the output.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Wall time of the exchange.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Why the device rejected the command, if it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Whether the device rejected the command.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Consume the result, keeping only the output text.
    pub fn into_raw_text(self) -> String {
        self.raw_text
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw_text)
    }
}
