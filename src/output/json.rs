//! Canonical JSON output.

use crate::finding::ScanResult;

/// Formats a [`ScanResult`] as pretty-printed canonical JSON.
///
/// # Panics
///
/// Panics if the result cannot be serialized (should not happen with valid data).
pub fn format(result: &ScanResult) -> String {
    let mut out = serde_json::to_string_pretty(result).expect("JSON serialization failed");
    out.push('\n');
    out
}
