//! Caller-supplied TextFSM templates.

use log::warn;
use serde_json::Value;
use textfsm_rust::Template;

use super::StructuredRecord;
use crate::error::{ParseError, Result};

/// A validated TextFSM template.
///
/// Field names in the resulting records are lower-cased, so a `Value
/// VERSION (\S+)` line yields records with a `version` key.
#[derive(Debug, Clone)]
pub struct TextTemplate {
    source: String,
    compiled: Template,
}

impl TextTemplate {
    /// Compile `source`, rejecting invalid templates up front.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let compiled = Template::parse_str(&source).map_err(|e| ParseError::InvalidTemplate {
            message: e.to_string(),
        })?;
        Ok(Self { source, compiled })
    }

    /// The template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the template over `raw`, one record per row.
    ///
    /// Output the template cannot process yields no records.
    pub fn extract(&self, raw: &str) -> Vec<StructuredRecord> {
        let mut parser = self.compiled.parser();
        let rows = match parser.parse_text_to_dicts(raw) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("template parse failed: {}", e);
                return vec![];
            }
        };

        rows.iter().filter_map(|row| to_record(serde_json::to_value(row).ok()?)).collect()
    }
}

fn to_record(row: Value) -> Option<StructuredRecord> {
    let Value::Object(fields) = row else {
        return None;
    };
    Some(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VERSION_TEMPLATE: &str = "\
Value VERSION (\\S+)
Value HOSTNAME (\\S+)

Start
  ^.*Software.*Version ${VERSION},
  ^${HOSTNAME} uptime is -> Record
";

    const SHOW_VERSION: &str = "\
Cisco IOS XE Software, Version 17.03.04a
Cisco IOS Software [Amsterdam], Virtual XE Software (X86_64_LINUX_IOSD-UNIVERSALK9-M), Version 17.3.4a, RELEASE SOFTWARE (fc3)
csr1000v-1 uptime is 2 days, 4 hours, 1 minute
";

    #[test]
    fn test_extract_lowercases_field_names() {
        let template = TextTemplate::new(VERSION_TEMPLATE).unwrap();
        let records = template.extract(SHOW_VERSION);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["hostname"], json!("csr1000v-1"));
        assert!(records[0].contains_key("version"));
    }

    #[test]
    fn test_unmatched_output_yields_nothing() {
        let template = TextTemplate::new(VERSION_TEMPLATE).unwrap();
        assert!(template.extract("% Invalid input detected").is_empty());
    }

    #[test]
    fn test_compiled_template_reused_across_extractions() {
        let template = TextTemplate::new(VERSION_TEMPLATE).unwrap();
        let shared = template.clone();

        let first = template.extract(SHOW_VERSION);
        let second = template.extract(SHOW_VERSION);
        let from_clone = shared.extract(SHOW_VERSION);

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(first, from_clone);
        assert_eq!(template.source(), VERSION_TEMPLATE);
    }

    #[test]
    fn test_invalid_template_rejected() {
        assert!(TextTemplate::new("Value BAD\n\nStart\n  ^x\n").is_err());
    }
}
