//! SARIF 2.1.0 → canonical [`ScanResult`] normalization.
//!
//! Only the subset of SARIF that maps onto a [`ResultItem`] is modelled:
//!
//! - `runs[].tool.driver.rules[]` supplies a rule-id → default-message lookup.
//! - `runs[].results[]` supplies `ruleId`, `message.text`, `level` and the
//!   first `locations[].physicalLocation`.
//!
//! The input model is deliberately lenient: every field except `runs` may be
//! absent or `null`, and unknown fields are ignored. Third-party engines emit
//! plenty of both.
//!
//! [`parse_sarif`] is pure. It keeps findings with an empty `checkId`;
//! engines drop those at finalization via
//! [`ScanResult::drop_unidentified`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ScanError;
use crate::finding::{Extra, Position, ResultItem, ScanResult};

/// File extension of SARIF reports.
pub const SARIF_EXTENSION: &str = "sarif";

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Deserialize)]
struct SarifLog {
    runs: Vec<SarifRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    #[serde(default)]
    tool: Option<SarifTool>,
    #[serde(default)]
    results: Option<Vec<SarifFinding>>,
}

#[derive(Debug, Default, Deserialize)]
struct SarifTool {
    #[serde(default)]
    driver: Option<SarifDriver>,
}

#[derive(Debug, Default, Deserialize)]
struct SarifDriver {
    #[serde(default)]
    rules: Option<Vec<SarifRule>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message_strings: Option<HashMap<String, SarifText>>,
    #[serde(default)]
    short_description: Option<SarifText>,
    #[serde(default)]
    full_description: Option<SarifText>,
}

/// Shared shape of `message` and `multiformatMessageString`.
#[derive(Debug, Default, Deserialize)]
struct SarifText {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifFinding {
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    rule: Option<SarifRuleReference>,
    #[serde(default)]
    rule_index: Option<i64>,
    #[serde(default)]
    message: Option<SarifText>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    locations: Option<Vec<SarifLocation>>,
}

#[derive(Debug, Deserialize)]
struct SarifRuleReference {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    #[serde(default)]
    physical_location: Option<SarifPhysicalLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    #[serde(default)]
    artifact_location: Option<SarifArtifactLocation>,
    #[serde(default)]
    region: Option<SarifRegion>,
}

#[derive(Debug, Deserialize)]
struct SarifArtifactLocation {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    #[serde(default)]
    start_line: Option<i64>,
    #[serde(default)]
    start_column: Option<i64>,
    #[serde(default)]
    end_line: Option<i64>,
    #[serde(default)]
    end_column: Option<i64>,
}

/// Normalizes one SARIF document.
///
/// Findings from every run are flattened into one list in document order.
/// Returns the deserialization error unchanged when the bytes are not a SARIF
/// log; nothing is partially consumed.
pub fn parse_sarif(data: &[u8]) -> serde_json::Result<ScanResult> {
    let log: SarifLog = serde_json::from_slice(data)?;
    let mut result = ScanResult::empty();

    for run in &log.runs {
        let rules: &[SarifRule] = run
            .tool
            .as_ref()
            .and_then(|t| t.driver.as_ref())
            .and_then(|d| d.rules.as_deref())
            .unwrap_or_default();

        let messages: HashMap<&str, &str> = rules
            .iter()
            .filter_map(|rule| rule_default_message(rule).map(|m| (rule.id.as_str(), m)))
            .collect();

        for finding in run.results.iter().flatten() {
            result.results.push(normalize_finding(finding, rules, &messages));
        }
    }

    Ok(result)
}

/// Reads and normalizes a single SARIF file.
pub fn parse_sarif_file(path: &Path) -> Result<ScanResult, ScanError> {
    let data = std::fs::read(path).map_err(|source| ScanError::ReportUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sarif(&data).map_err(|source| ScanError::ReportParseFailed {
        report: path.display().to_string(),
        source,
    })
}

/// Recursively normalizes every `*.sarif` file under `dir` and concatenates
/// their findings.
///
/// Files are visited in lexical file-name order. A missing `dir`, an
/// unreadable entry, or a single unparsable file fails the whole call.
/// Findings are not deduplicated across files.
pub fn parse_sarif_files(dir: &Path) -> Result<ScanResult, ScanError> {
    let mut result = ScanResult::empty();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ScanError::ReportUnreadable {
                path,
                source: e.into(),
            }
        })?;

        let path = entry.path();
        if !entry.file_type().is_file()
            || !path.extension().is_some_and(|ext| ext == SARIF_EXTENSION)
        {
            continue;
        }

        tracing::debug!(report = %path.display(), "parsing SARIF report");
        result.merge(parse_sarif_file(path)?);
    }

    Ok(result)
}

fn rule_default_message(rule: &SarifRule) -> Option<&str> {
    rule.message_strings
        .as_ref()
        .and_then(|m| m.get("default"))
        .and_then(|t| t.text.as_deref())
        .or_else(|| rule.short_description.as_ref().and_then(|t| t.text.as_deref()))
        .or_else(|| rule.full_description.as_ref().and_then(|t| t.text.as_deref()))
}

/// Resolves a finding's rule id from `ruleId`, then `rule.id`, then
/// `ruleIndex` into the run's rule table.
fn finding_rule_id<'a>(finding: &'a SarifFinding, rules: &'a [SarifRule]) -> &'a str {
    finding
        .rule_id
        .as_deref()
        .or_else(|| finding.rule.as_ref().and_then(|r| r.id.as_deref()))
        .or_else(|| {
            finding
                .rule_index
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| rules.get(i))
                .map(|r| r.id.as_str())
        })
        .unwrap_or_default()
}

fn normalize_finding(
    finding: &SarifFinding,
    rules: &[SarifRule],
    messages: &HashMap<&str, &str>,
) -> ResultItem {
    let check_id = finding_rule_id(finding, rules);

    let message = finding
        .message
        .as_ref()
        .and_then(|m| m.text.as_deref())
        .filter(|text| !text.is_empty())
        .or_else(|| messages.get(check_id).copied())
        .unwrap_or_default();

    let mut item = ResultItem {
        check_id: check_id.to_string(),
        extra: Extra::new(message.to_string(), finding.level.clone()),
        ..ResultItem::default()
    };

    // A finding maps to exactly one item: only the first location counts.
    let physical = finding
        .locations
        .as_ref()
        .and_then(|locations| locations.first())
        .and_then(|location| location.physical_location.as_ref());

    if let Some(physical) = physical {
        if let Some(uri) = physical.artifact_location.as_ref().and_then(|a| a.uri.as_deref()) {
            item.path = uri.strip_prefix(FILE_SCHEME).unwrap_or(uri).to_string();
        }

        if let Some(region) = &physical.region {
            item.start = Position {
                line: to_position(region.start_line),
                col: to_position(region.start_column),
            };
            item.end = Position {
                line: region
                    .end_line
                    .map_or(item.start.line, |line| to_position(Some(line))),
                col: to_position(region.end_column),
            };
        }
    }

    item
}

/// Clamps a SARIF integer into the 1-based position space; absent or
/// out-of-range values become `0` (unknown).
fn to_position(value: Option<i64>) -> u32 {
    value.and_then(|v| u32::try_from(v).ok()).unwrap_or(0)
}
