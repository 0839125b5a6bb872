//! Gateway request and output types.

use serde::Serialize;

use crate::directive::ConfigDirective;
use crate::driver::{CommandResult, InteractiveStep};
use crate::normalize::{StructuredRecord, TextTemplate};

/// What to send once the session is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// One command, or newline-separated config lines.
    Single(String),

    /// An ordered interactive flow.
    Interactive(Vec<InteractiveStep>),
}

/// How template records are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordSelection {
    /// One record comes back as that record; several stay a list.
    #[default]
    UnwrapSingle,

    /// Always a list.
    All,

    /// Only the first record.
    First,
}

impl RecordSelection {
    /// Shape `records`, or `None` when there is nothing to return.
    pub fn apply(self, mut records: Vec<StructuredRecord>) -> Option<CommandOutput> {
        if records.is_empty() {
            return None;
        }
        let output = match self {
            RecordSelection::UnwrapSingle if records.len() == 1 => {
                CommandOutput::Structured(records.swap_remove(0))
            }
            RecordSelection::UnwrapSingle | RecordSelection::All => CommandOutput::Records(records),
            RecordSelection::First => CommandOutput::Structured(records.swap_remove(0)),
        };
        Some(output)
    }
}

/// A show-command request.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub exchange: Exchange,

    /// Template to apply instead of the registered parsers.
    pub template: Option<TextTemplate>,

    pub selection: RecordSelection,

    /// Replaces the platform's failure markers for this call.
    pub failed_when_contains: Option<Vec<String>>,
}

impl CommandRequest {
    /// Run a single command.
    pub fn command(command: impl Into<String>) -> Self {
        Self::from_exchange(Exchange::Single(command.into()))
    }

    /// Run an interactive flow.
    pub fn interactive(steps: Vec<InteractiveStep>) -> Self {
        Self::from_exchange(Exchange::Interactive(steps))
    }

    fn from_exchange(exchange: Exchange) -> Self {
        Self {
            exchange,
            template: None,
            selection: RecordSelection::default(),
            failed_when_contains: None,
        }
    }

    pub fn with_template(mut self, template: TextTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_selection(mut self, selection: RecordSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_failure_markers(mut self, markers: Vec<String>) -> Self {
        self.failed_when_contains = Some(markers);
        self
    }
}

/// A configuration request.
#[derive(Debug, Clone)]
pub struct ConfigRequest {
    pub exchange: Exchange,

    /// Stop at the first rejected line.
    pub stop_on_failed: bool,

    /// Replaces the platform's failure markers for this call.
    pub failed_when_contains: Option<Vec<String>>,
}

impl ConfigRequest {
    /// Send newline-separated config lines.
    pub fn lines(config: impl Into<String>) -> Self {
        Self::from_exchange(Exchange::Single(config.into()))
    }

    /// Send the lines a directive renders to.
    pub fn directive(directive: &impl ConfigDirective) -> Self {
        Self::lines(directive.render())
    }

    /// Run an interactive flow from configuration mode.
    pub fn interactive(steps: Vec<InteractiveStep>) -> Self {
        Self::from_exchange(Exchange::Interactive(steps))
    }

    fn from_exchange(exchange: Exchange) -> Self {
        Self {
            exchange,
            stop_on_failed: false,
            failed_when_contains: None,
        }
    }

    pub fn with_stop_on_failed(mut self, stop: bool) -> Self {
        self.stop_on_failed = stop;
        self
    }

    pub fn with_failure_markers(mut self, markers: Vec<String>) -> Self {
        self.failed_when_contains = Some(markers);
        self
    }
}

/// Result of a show command.
///
/// Serializes as the bare payload: an object, a list, a string, or the
/// rejected [`CommandResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    /// Output parsed into a single record.
    Structured(StructuredRecord),

    /// Several template records.
    Records(Vec<StructuredRecord>),

    /// No parser or template applied; the device text.
    Raw(String),

    /// The device rejected the command. Never normalized.
    Rejected(CommandResult),
}

impl CommandOutput {
    /// Whether the device rejected the command.
    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandOutput::Rejected(_))
    }
}
