//! Pattern helpers for prompt and interactive-step detection.

use regex::bytes::Regex;

use crate::platform::PrivilegeLevel;

/// Build a single regex matching the prompt of any of the given levels.
///
/// Each level's pattern keeps its own inline flags inside a non-capturing
/// group, so `(?m)` on one level does not leak into another.
pub fn combined_prompt_pattern<'a>(
    levels: impl IntoIterator<Item = &'a PrivilegeLevel>,
) -> Result<Regex, regex::Error> {
    let patterns: Vec<String> = levels
        .into_iter()
        .map(|level| format!("(?:{})", level.pattern.as_str()))
        .collect();

    if patterns.is_empty() {
        return Regex::new(r"[$#>]\s*$");
    }
    Regex::new(&patterns.join("|"))
}

/// Compile a literal substring (such as `Password:`) into a regex.
pub fn literal_pattern(text: &str) -> Result<Regex, regex::Error> {
    Regex::new(&regex::escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_pattern_matches_each_level() {
        let user = PrivilegeLevel::new("user", r"(?m)^\S+>\s?$").unwrap();
        let privileged = PrivilegeLevel::new("privileged", r"(?m)^[\w.\-]+#\s?$").unwrap();
        let pattern = combined_prompt_pattern([&user, &privileged]).unwrap();

        assert!(pattern.is_match(b"output\nrouter>"));
        assert!(pattern.is_match(b"output\nrouter# "));
        assert!(!pattern.is_match(b"router#show vlan"));
    }

    #[test]
    fn test_combined_pattern_fallback() {
        let pattern = combined_prompt_pattern([]).unwrap();
        assert!(pattern.is_match(b"host$ "));
    }

    #[test]
    fn test_literal_pattern_escapes_metacharacters() {
        let pattern = literal_pattern("Source filename []?").unwrap();
        assert!(pattern.is_match(b"Source filename []? "));
        assert!(!pattern.is_match(b"Source filename x"));
    }
}
