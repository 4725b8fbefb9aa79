//! Canonical vulnerability-report schema.
//!
//! Every engine, whatever its native output, produces a [`ScanResult`]. The
//! serialized shape is the contract with the dispatch layer:
//!
//! ```json
//! {"id": "...", "prefix": "corax", "output": "...",
//!  "results": [{"checkId": "...", "path": "src/A.java",
//!               "start": {"line": 3, "col": 5}, "end": {"line": 3, "col": 0},
//!               "extra": {"message": "...", "severity": "WARNING",
//!                         "metadata": {"messageZh": "...",
//!                                      "abstractFeysh": {"en-US": "...", "zh-CN": "..."}}}}]}
//! ```
//!
//! Severity labels are passed through from each engine unmapped; there is no
//! unified scale across engines.

use std::collections::BTreeMap;
use std::path::Path;

/// Severity used when an engine reports none.
pub const DEFAULT_SEVERITY: &str = "WARNING";

/// Locale keys populated in [`Metadata::abstract_feysh`].
pub const LOCALES: [&str; 2] = ["en-US", "zh-CN"];

/// Output of one scan invocation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScanResult {
    /// Request correlation id, echoed verbatim.
    pub id: String,
    /// Provenance tag of the engine that produced this result.
    pub prefix: String,
    /// Raw combined stdout/stderr of the engine process.
    pub output: String,
    /// Findings in the order engines and report files were processed.
    #[serde(default)]
    pub results: Vec<ResultItem>,
}

/// One finding.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub check_id: String,
    /// Relative to the scanned workspace; empty when no location was reported.
    pub path: String,
    pub start: Position,
    pub end: Position,
    pub extra: Extra,
}

/// 1-based line/column; `0` means not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extra {
    pub message: String,
    pub severity: String,
    pub metadata: Metadata,
}

/// Localized message bag.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub message_zh: String,
    pub abstract_feysh: BTreeMap<String, String>,
}

impl Metadata {
    /// Builds the bag from a single untranslated message, duplicating it into
    /// every locale slot.
    pub fn from_message(message: &str) -> Self {
        Metadata {
            message_zh: message.to_string(),
            abstract_feysh: LOCALES
                .iter()
                .map(|locale| (locale.to_string(), message.to_string()))
                .collect(),
        }
    }
}

impl Extra {
    pub fn new(message: String, severity: Option<String>) -> Self {
        let metadata = Metadata::from_message(&message);
        Extra {
            message,
            severity: severity.unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            metadata,
        }
    }
}

impl ScanResult {
    /// An empty result; `results` is an initialized empty vector so the
    /// serialized form always carries `"results": []`.
    pub fn empty() -> Self {
        ScanResult::default()
    }

    /// Stamps provenance onto a collected result. Called exactly once, by the
    /// scanner that produced it.
    pub fn finalize(mut self, id: &str, prefix: &str, output: String) -> Self {
        self.id = id.to_string();
        self.prefix = prefix.to_string();
        self.output = output;
        self
    }

    /// Appends another result's findings, preserving order.
    pub fn merge(&mut self, other: ScanResult) {
        self.results.extend(other.results);
    }

    /// Removes findings without a rule identifier and returns how many were
    /// dropped.
    pub fn drop_unidentified(&mut self) -> usize {
        let before = self.results.len();
        self.results.retain(|item| !item.check_id.is_empty());
        before - self.results.len()
    }

    /// Rewrites absolute finding paths under `workspace` to be relative to it.
    /// Paths outside the workspace and already-relative paths are untouched.
    pub fn relativize_paths(&mut self, workspace: &Path) {
        for item in &mut self.results {
            if item.path.is_empty() {
                continue;
            }
            if let Ok(rel) = Path::new(&item.path).strip_prefix(workspace) {
                item.path = rel.to_string_lossy().replace('\\', "/");
            }
        }
    }

    /// Tallies findings by their (engine-defined) severity label, in
    /// first-seen order.
    pub fn count_by_severity(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for item in &self.results {
            let severity = item.extra.severity.as_str();
            match counts.iter_mut().find(|(s, _)| *s == severity) {
                Some((_, n)) => *n += 1,
                None => counts.push((severity, 1)),
            }
        }
        counts
    }
}
