//! Output normalization: raw terminal text to structured records.
//!
//! Two strategies, chosen by the caller:
//!
//! - **Registered parsers**, looked up by platform and command through a
//!   [`ParserRegistry`]. Absence of a parser is an ordinary outcome
//!   ([`ParseOutcome::NoParser`]), not an error.
//! - **Templates** supplied with the request ([`TextTemplate`], TextFSM
//!   syntax), producing a list of records.
//!
//! Neither strategy fails on garbled output; they produce empty structure
//! and the caller falls back to the raw text.

mod registry;
mod template;

pub use registry::{CommandArgs, CommandParser, ParserRegistry};
pub use template::TextTemplate;

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::error::Result;
use crate::platform::vendors;

/// Nested key/value data produced from device output.
pub type StructuredRecord = IndexMap<String, Value>;

/// Result of the registered-parser strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A parser matched and produced data.
    Structured(StructuredRecord),

    /// No parser is registered for this platform and command.
    NoParser,

    /// A parser exists but found nothing it recognised in the output.
    NoMatch,
}

impl ParseOutcome {
    /// The structured record, if one was produced.
    pub fn into_record(self) -> Option<StructuredRecord> {
        match self {
            ParseOutcome::Structured(record) => Some(record),
            ParseOutcome::NoParser | ParseOutcome::NoMatch => None,
        }
    }
}

/// Applies registered parsers and caller templates to device output.
#[derive(Debug, Default)]
pub struct Normalizer {
    registry: ParserRegistry,
}

impl Normalizer {
    /// Create a normalizer over an existing registry.
    pub fn new(registry: ParserRegistry) -> Self {
        Self { registry }
    }

    /// Create a normalizer with all built-in vendor parsers registered.
    pub fn with_builtin_parsers() -> Result<Self> {
        let mut registry = ParserRegistry::new();
        vendors::cisco_iosxe::register_parsers(&mut registry)?;
        Ok(Self { registry })
    }

    /// Get the parser registry.
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Get a mutable reference to the parser registry.
    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// Parse `raw` with the parser registered for `(platform, command)`.
    pub fn structured(&self, platform: &str, command: &str, raw: &str) -> ParseOutcome {
        let Some((parser, args)) = self.registry.lookup(platform, command) else {
            debug!("no parser for {platform} '{command}'");
            return ParseOutcome::NoParser;
        };

        let record = parser.parse(raw, &args);
        if record.is_empty() {
            debug!("parser for {platform} '{command}' matched nothing");
            ParseOutcome::NoMatch
        } else {
            ParseOutcome::Structured(record)
        }
    }

    /// Extract records from `raw` with a caller-supplied template.
    pub fn templated(&self, template: &TextTemplate, raw: &str) -> Vec<StructuredRecord> {
        template.extract(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHOW_VLAN: &str = "\
VLAN Name                             Status    Ports
---- -------------------------------- --------- -------------------------------
1    default                          active    Gi1/0/1, Gi1/0/2
";

    #[test]
    fn test_builtin_structured() {
        let normalizer = Normalizer::with_builtin_parsers().unwrap();
        let record = normalizer
            .structured("cisco_iosxe", "show vlan", SHOW_VLAN)
            .into_record()
            .unwrap();
        assert_eq!(record["vlans"]["1"]["name"], json!("default"));
    }

    #[test]
    fn test_no_parser_is_not_an_error() {
        let normalizer = Normalizer::with_builtin_parsers().unwrap();
        assert_eq!(
            normalizer.structured("cisco_iosxe", "show clock", "*10:00:00 UTC Mon"),
            ParseOutcome::NoParser
        );
        assert_eq!(
            normalizer.structured("juniper_junos", "show vlan", SHOW_VLAN),
            ParseOutcome::NoParser
        );
    }

    #[test]
    fn test_garbled_output_is_no_match() {
        let normalizer = Normalizer::with_builtin_parsers().unwrap();
        assert_eq!(
            normalizer.structured("cisco_iosxe", "show vlan", "\u{1}\u{2}garbage ~~~"),
            ParseOutcome::NoMatch
        );
    }

    #[test]
    fn test_custom_parser_registration() {
        let mut normalizer = Normalizer::default();
        normalizer
            .registry_mut()
            .register("lab", "show clock", |raw: &str, _: &CommandArgs| {
                let mut record = StructuredRecord::new();
                record.insert("clock".to_string(), json!(raw.trim()));
                record
            })
            .unwrap();

        let record = normalizer
            .structured("lab", "show  clock", " 10:00 ")
            .into_record()
            .unwrap();
        assert_eq!(record["clock"], json!("10:00"));
    }
}
