//! Structural probes for execution blocks
//!
//! Each named probe checks one element a properly executed document carries.
//! Failing probes are reported together in a single issue per document.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // The leading (?i) covers the name part too: any two words after the cue.
    static ref SIGNATORY_NAME: Regex = Regex::new(
        r"(?i)(signed|signature|signed by|executed by).*\b[A-Z][a-z]+ [A-Z][a-z]+\b"
    )
    .unwrap();
    static ref CAPACITY: Regex = Regex::new(r"(?i)(director|officer|authorized|capacity)").unwrap();
    static ref SIGNATURE_OR_ESIGN: Regex =
        Regex::new(r"(?i)(signature|signed|electronic signature|e-sign)").unwrap();
    // d/m/yyyy, d-m-yyyy, yyyy/m/d, yyyy-m-d
    static ref DATE: Regex = Regex::new(
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b|\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b"
    )
    .unwrap();
}

/// Probe names accepted in a structural rule's `checks` list.
pub const KNOWN_CHECKS: &[&str] = &[
    "has_signatory_name",
    "has_capacity",
    "has_signature_or_e-sign",
    "has_date",
];

fn probe(check: &str, text: &str) -> Option<bool> {
    match check {
        "has_signatory_name" => Some(SIGNATORY_NAME.is_match(text)),
        "has_capacity" => Some(CAPACITY.is_match(text)),
        "has_signature_or_e-sign" => Some(SIGNATURE_OR_ESIGN.is_match(text)),
        "has_date" => Some(DATE.is_match(text)),
        _ => None,
    }
}

fn element_name(check: &str) -> &'static str {
    match check {
        "has_signatory_name" => "signatory name",
        "has_capacity" => "capacity",
        "has_signature_or_e-sign" => "signature",
        _ => "date",
    }
}

/// Runs the requested probes over `text` and names each failing element.
/// Unknown probe names are logged and ignored.
pub fn missing_elements(checks: &[String], text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    for check in checks {
        match probe(check, text) {
            Some(true) => {}
            Some(false) => missing.push(element_name(check)),
            None => tracing::warn!("Unknown structural check '{}', ignoring", check),
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_checks() -> Vec<String> {
        KNOWN_CHECKS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_complete_execution_block_passes() {
        let text = "Signed by John Smith, Director, on 12/03/2024. Signature: ____";
        // Underscores are a template matter, not a structural one
        let missing = missing_elements(&all_checks(), text);
        assert!(missing.is_empty(), "unexpected missing: {missing:?}");
    }

    #[test]
    fn test_unsigned_draft_fails_all_probes() {
        let text = "This agreement sets out the terms between the parties.";
        let missing = missing_elements(&all_checks(), text);
        assert_eq!(missing, vec!["signatory name", "capacity", "signature", "date"]);
    }

    #[test]
    fn test_missing_date_only() {
        let text = "Executed by Jane Doe in her capacity as Officer. Signature affixed.";
        let missing = missing_elements(&all_checks(), text);
        assert_eq!(missing, vec!["date"]);
    }

    #[test]
    fn test_iso_date_accepted() {
        let text = "Signed by Amal Nasser, Director. Date: 2024-03-12";
        let missing = missing_elements(&all_checks(), text);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unknown_probe_ignored() {
        let checks = vec!["has_notary_seal".to_string(), "has_date".to_string()];
        let missing = missing_elements(&checks, "no date here");
        assert_eq!(missing, vec!["date"]);
    }

    #[test]
    fn test_requested_subset_only() {
        let checks = vec!["has_date".to_string()];
        let missing = missing_elements(&checks, "Signed by Nobody on an unknown day");
        assert_eq!(missing, vec!["date"]);
    }
}
