//! Parser registry keyed by platform and command pattern.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use super::StructuredRecord;
use crate::error::{ParseError, Result};

/// Values bound to `{placeholder}` segments of a command pattern.
pub type CommandArgs = IndexMap<String, String>;

/// Turns the raw output of one command into structured data.
///
/// Implementations return an empty record when nothing in the output is
/// recognised; they never fail.
pub trait CommandParser: Send + Sync {
    /// Parse `output`. `args` holds the values captured from the command.
    fn parse(&self, output: &str, args: &CommandArgs) -> StructuredRecord;
}

impl<F> CommandParser for F
where
    F: Fn(&str, &CommandArgs) -> StructuredRecord + Send + Sync,
{
    fn parse(&self, output: &str, args: &CommandArgs) -> StructuredRecord {
        self(output, args)
    }
}

/// A command template such as `show vlan id {vlan_id}`.
///
/// Keywords match case-insensitively and any run of whitespace between
/// words is accepted; each placeholder captures a single word.
#[derive(Debug, Clone)]
struct CommandPattern {
    source: String,
    regex: Regex,
}

impl CommandPattern {
    fn compile(pattern: &str) -> Result<Self> {
        let words: Vec<String> = pattern
            .split_whitespace()
            .map(|word| match placeholder_name(word) {
                Some(name) => format!(r"(?P<{name}>\S+)"),
                None => format!("(?i:{})", regex::escape(word)),
            })
            .collect();

        let regex = Regex::new(&format!(r"^\s*{}\s*$", words.join(r"\s+"))).map_err(|source| {
            ParseError::InvalidCommandPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    fn captures(&self, command: &str) -> Option<CommandArgs> {
        let caps = self.regex.captures(command)?;
        let args = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        Some(args)
    }
}

fn placeholder_name(word: &str) -> Option<&str> {
    let name = word.strip_prefix('{')?.strip_suffix('}')?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

struct Entry {
    platform: String,
    pattern: CommandPattern,
    parser: Arc<dyn CommandParser>,
}

/// Registered parsers, searched in registration order.
#[derive(Default)]
pub struct ParserRegistry {
    entries: Vec<Entry>,
}

impl ParserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser` for commands matching `pattern` on `platform`.
    pub fn register(
        &mut self,
        platform: impl Into<String>,
        pattern: &str,
        parser: impl CommandParser + 'static,
    ) -> Result<()> {
        self.register_shared(platform, pattern, Arc::new(parser))
    }

    /// Register one parser instance under several patterns.
    pub fn register_shared(
        &mut self,
        platform: impl Into<String>,
        pattern: &str,
        parser: Arc<dyn CommandParser>,
    ) -> Result<()> {
        self.entries.push(Entry {
            platform: platform.into(),
            pattern: CommandPattern::compile(pattern)?,
            parser,
        });
        Ok(())
    }

    /// Find the first parser whose pattern matches `command` on `platform`.
    pub fn lookup(&self, platform: &str, command: &str) -> Option<(&dyn CommandParser, CommandArgs)> {
        self.entries
            .iter()
            .filter(|entry| entry.platform == platform)
            .find_map(|entry| {
                entry
                    .pattern
                    .captures(command)
                    .map(|args| (entry.parser.as_ref(), args))
            })
    }

    /// Command patterns with a parser on `platform`.
    pub fn commands<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.platform == platform)
            .map(|entry| entry.pattern.source.as_str())
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parser is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| format!("{}: {}", entry.platform, entry.pattern.source)),
            )
            .finish()
    }
}
