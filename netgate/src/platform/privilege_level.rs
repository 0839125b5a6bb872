//! Privilege levels and how a prompt identifies them.

use regex::bytes::Regex;

/// One CLI mode a device session can be in, such as user EXEC,
/// privileged EXEC or global configuration.
///
/// A level hangs off its `parent`: `enter_command` moves from the parent
/// into this level, `exit_command` moves back.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    pub name: String,

    /// Prompt pattern, matched against the prompt line.
    pub pattern: Regex,

    pub parent: Option<String>,

    pub enter_command: Option<String>,

    pub exit_command: Option<String>,

    /// Shown while entering this level when the device wants a secret.
    pub password_prompt: Option<Regex>,

    /// Prompt substrings that rule this level out even if `pattern` matches.
    pub excludes: Vec<String>,
}

impl PrivilegeLevel {
    /// A root level identified by `pattern`.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            parent: None,
            enter_command: None,
            exit_command: None,
            password_prompt: None,
            excludes: vec![],
        })
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn entered_with(mut self, command: impl Into<String>) -> Self {
        self.enter_command = Some(command.into());
        self
    }

    pub fn left_with(mut self, command: impl Into<String>) -> Self {
        self.exit_command = Some(command.into());
        self
    }

    /// Expect a password prompt matching `pattern` while entering.
    pub fn with_password_prompt(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.password_prompt = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn excluding(mut self, text: impl Into<String>) -> Self {
        self.excludes.push(text.into());
        self
    }

    /// Whether `prompt` belongs to this level.
    pub fn matches(&self, prompt: &str) -> bool {
        !self.excludes.iter().any(|text| prompt.contains(text.as_str()))
            && self.pattern.is_match(prompt.as_bytes())
    }
}
