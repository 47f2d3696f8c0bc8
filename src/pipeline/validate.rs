//! Structural validation of generated HTML documents.

use serde::{Deserialize, Serialize};

/// Outcome of a structural check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

/// Check that a document carries the minimal HTML skeleton.
///
/// Each check is independent and case-insensitive; every failing check adds
/// exactly one issue.
pub fn validate_html_structure(document: &str) -> ValidationResult {
    let lowered = document.to_lowercase();
    let has_all = |markers: &[&str]| markers.iter().all(|m| lowered.contains(m));

    let checks: [(&[&str], &str); 4] = [
        (&["<!doctype html"], "Missing <!DOCTYPE html> declaration."),
        (&["<html", "</html>"], "The <html> or </html> tag is missing."),
        (&["<head", "</head>"], "The <head> section is incomplete."),
        (&["<body", "</body>"], "The <body> section is incomplete."),
    ];

    let issues = checks
        .iter()
        .filter(|(markers, _)| !has_all(markers))
        .map(|(_, issue)| issue.to_string())
        .collect();

    ValidationResult::from_issues(issues)
}
