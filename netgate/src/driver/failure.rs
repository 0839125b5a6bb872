//! Detection of device-side command rejection.
//!
//! Devices signal a rejected command only through free text such as
//! `% Invalid input detected at '^' marker.`. Detection is a plain,
//! case-sensitive substring scan over a caller-chosen marker set.

use memchr::memmem;

/// First marker found in `raw`, in marker order.
pub fn find_failure<'a, S: AsRef<str>>(raw: &str, markers: &'a [S]) -> Option<&'a str> {
    markers
        .iter()
        .map(|marker| marker.as_ref())
        .find(|marker| memmem::find(raw.as_bytes(), marker.as_bytes()).is_some())
}

/// Whether `raw` contains any of `markers`. Always false for no markers.
pub fn is_failure<S: AsRef<str>>(raw: &str, markers: &[S]) -> bool {
    find_failure(raw, markers).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::vendors::cisco_iosxe::FAILURE_MARKERS;
    use proptest::prelude::*;

    #[test]
    fn test_iosxe_rejections() {
        let invalid = "show vlna\n        ^\n% Invalid input detected at '^' marker.";
        assert!(is_failure(invalid, &FAILURE_MARKERS));
        assert_eq!(find_failure(invalid, &FAILURE_MARKERS), Some("% Invalid input detected"));

        assert!(is_failure("% Ambiguous command:  \"sh\"", &FAILURE_MARKERS));
        assert!(is_failure("% Incomplete command.", &FAILURE_MARKERS));
        assert!(!is_failure("VLAN Name   Status", &FAILURE_MARKERS));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!is_failure("% invalid input detected", &FAILURE_MARKERS));
    }

    #[test]
    fn test_empty_marker_set() {
        let none: [&str; 0] = [];
        assert!(!is_failure("% Invalid input detected", &none));
    }

    proptest! {
        #[test]
        fn prop_matches_substring_semantics(
            raw in ".{0,200}",
            markers in proptest::collection::vec(".{1,12}", 0..5),
        ) {
            let expected = markers.iter().any(|m| raw.contains(m.as_str()));
            prop_assert_eq!(is_failure(&raw, &markers), expected);
        }

        #[test]
        fn prop_embedded_marker_is_found(
            prefix in ".{0,80}",
            suffix in ".{0,80}",
            idx in 0usize..4,
        ) {
            let marker = FAILURE_MARKERS[idx];
            let raw = format!("{prefix}{marker}{suffix}");
            prop_assert!(is_failure(&raw, &FAILURE_MARKERS));
        }

        #[test]
        fn prop_no_markers_never_fails(raw in ".{0,200}") {
            let none: Vec<String> = vec![];
            prop_assert!(!is_failure(&raw, &none));
        }
    }
}
