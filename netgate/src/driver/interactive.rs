//! Scripted multi-step exchanges.
//!
//! Some commands stop and ask questions (`copy flash: scp:` asks for a
//! source file, a host, a username and a password). An interactive flow is
//! an ordered list of steps: send `input`, then wait until `expect` shows
//! up before sending the next one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Text shown in logs and results in place of a hidden input.
pub const HIDDEN_INPUT: &str = "<hidden>";

/// One step of an interactive flow.
///
/// Deserializes from `{"input", "expect", "hidden"}` objects as well as the
/// compact `["input", "expect", hidden]` form; `hidden` defaults to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StepRepr")]
pub struct InteractiveStep {
    /// Text sent to the device, followed by a newline.
    pub input: String,

    /// Literal text that must appear before the next step runs.
    pub expect: String,

    /// Keep `input` out of logs and results (passwords).
    pub hidden: bool,

    /// Per-step wait; the driver's operation timeout when unset.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl InteractiveStep {
    /// A visible step.
    pub fn new(input: impl Into<String>, expect: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expect: expect.into(),
            hidden: false,
            timeout: None,
        }
    }

    /// A step whose input is never logged.
    pub fn hidden(input: impl Into<String>, expect: impl Into<String>) -> Self {
        Self {
            hidden: true,
            ..Self::new(input, expect)
        }
    }

    /// Override the wait for this step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The input as it may appear in logs.
    pub fn display_input(&self) -> &str {
        if self.hidden { HIDDEN_INPUT } else { &self.input }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Full(String, String, bool),
    Short(String, String),
    Named {
        input: String,
        expect: String,
        #[serde(default)]
        hidden: bool,
    },
}

impl From<StepRepr> for InteractiveStep {
    fn from(repr: StepRepr) -> Self {
        match repr {
            StepRepr::Full(input, expect, true) => Self::hidden(input, expect),
            StepRepr::Full(input, expect, false) | StepRepr::Short(input, expect) => {
                Self::new(input, expect)
            }
            StepRepr::Named {
                input,
                expect,
                hidden,
            } => Self {
                hidden,
                ..Self::new(input, expect)
            },
        }
    }
}

/// Builder for interactive flows.
///
/// ```rust
/// use netgate::driver::InteractiveBuilder;
///
/// let steps = InteractiveBuilder::new()
///     .send("copy flash: scp:")
///     .expect("Source filename []?")
///     .send("backup.cfg")
///     .expect("Address or name of remote host []?")
///     .send_hidden("super_secure_password")
///     .expect("csr1000v#")
///     .build();
/// assert_eq!(steps.len(), 3);
/// assert!(steps[2].hidden);
/// ```
#[derive(Debug, Default)]
pub struct InteractiveBuilder {
    steps: Vec<InteractiveStep>,
    default_timeout: Option<Duration>,
}

impl InteractiveBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input; must be followed by `expect()`.
    pub fn send(self, input: impl Into<String>) -> PendingStep {
        PendingStep {
            builder: self,
            input: input.into(),
            hidden: false,
            timeout: None,
        }
    }

    /// Add an input that is never logged.
    pub fn send_hidden(self, input: impl Into<String>) -> PendingStep {
        PendingStep {
            builder: self,
            input: input.into(),
            hidden: true,
            timeout: None,
        }
    }

    /// Set the wait used by steps without their own timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Finish the flow.
    pub fn build(self) -> Vec<InteractiveStep> {
        self.steps
    }
}

/// Builder state after `send()`, waiting for its expectation.
#[derive(Debug)]
pub struct PendingStep {
    builder: InteractiveBuilder,
    input: String,
    hidden: bool,
    timeout: Option<Duration>,
}

impl PendingStep {
    /// Text to wait for after sending the input.
    pub fn expect(mut self, expect: impl Into<String>) -> InteractiveBuilder {
        self.builder.steps.push(InteractiveStep {
            input: self.input,
            expect: expect.into(),
            hidden: self.hidden,
            timeout: self.timeout.or(self.builder.default_timeout),
        });
        self.builder
    }

    /// Wait for this step only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
