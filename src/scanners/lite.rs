//! Build-free analysis via a [semgrep](https://semgrep.dev/)-compatible
//! binary.
//!
//! # How it works
//!
//! 1. Checks that the workspace exists.
//! 2. Spawns `<program> scan --json --quiet --config <selector> <workspace>`,
//!    where the selector is the configured rule template with `{rule}`
//!    replaced by the request's rule key.
//! 3. Parses the JSON `results` array into [`ResultItem`]s. semgrep's own
//!    `check_id`/`start`/`end`/`extra` layout is already the canonical one;
//!    only severity defaults and the locale bag need filling in.
//!
//! semgrep exits non-zero for some finding configurations, so the exit code
//! alone does not decide failure: a parsable report with an empty `errors`
//! array wins. A non-zero exit whose report lists errors is a failed scan.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::LiteConfig;
use crate::error::ScanError;
use crate::finding::{Extra, Metadata, Position, ResultItem, ScanResult};
use crate::process::{which_exists, CommandRunner, Invocation, SystemRunner};
use crate::scanners::{ensure_workspace, finish, Scanner};

/// Lightweight engine wrapping a semgrep-compatible CLI.
pub struct LightweightEngine {
    config: LiteConfig,
    runner: Arc<dyn CommandRunner>,
}

impl LightweightEngine {
    pub fn new(config: LiteConfig, runner: Arc<dyn CommandRunner>) -> Self {
        LightweightEngine { config, runner }
    }

    pub fn with_defaults() -> Self {
        LightweightEngine::new(LiteConfig::default(), Arc::new(SystemRunner))
    }

    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn config(&self) -> &LiteConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        which_exists(&self.config.program)
    }

    fn invocation(&self, workspace: &Path, rule: &str) -> Invocation {
        Invocation::new(self.config.program.as_str())
            .args(["scan", "--json", "--quiet", "--config"])
            .arg(self.config.rule_selector(rule))
            .arg(workspace)
            .timeout(self.config.timeout())
    }
}

impl Scanner for LightweightEngine {
    fn scan(&self, id: &str, workspace: &Path, rule: &str) -> Result<ScanResult, ScanError> {
        ensure_workspace(workspace)?;

        let invocation = self.invocation(workspace, rule);
        tracing::debug!(id, command = %invocation.display(), "executing lightweight scan");

        let out = self
            .runner
            .run(&invocation)
            .map_err(|e| ScanError::ToolInvocationFailed {
                program: invocation.display(),
                reason: e.to_string(),
                output: String::new(),
            })?;

        let raw = out.output_lossy();
        let root: Value = match parse_report(&out.output) {
            Ok(v) => v,
            Err(_) if !out.success() => {
                return Err(ScanError::ToolInvocationFailed {
                    program: invocation.display(),
                    reason: out.status_text(),
                    output: raw,
                });
            }
            Err(source) => {
                return Err(ScanError::ReportParseFailed {
                    report: format!("{} stdout", self.config.program),
                    source,
                });
            }
        };

        // Fatal exits (bad config, unreadable rules) still print a report,
        // with an empty `results` and the cause in `errors`.
        if !out.success() && has_errors(&root) {
            return Err(ScanError::ToolInvocationFailed {
                program: invocation.display(),
                reason: out.status_text(),
                output: raw,
            });
        }

        let result = ScanResult {
            results: root["results"]
                .as_array()
                .map(|items| items.iter().map(to_item).collect())
                .unwrap_or_default(),
            ..ScanResult::empty()
        };

        Ok(finish(result, id, &self.config.prefix, workspace, raw))
    }

    fn name(&self) -> &str {
        &self.config.prefix
    }
}

/// Parses the JSON report out of the combined output.
///
/// stderr is appended after stdout, so the report is the first JSON value in
/// the stream; trailing diagnostics are ignored.
fn parse_report(output: &[u8]) -> serde_json::Result<Value> {
    let mut stream = serde_json::Deserializer::from_slice(output).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) if value.is_object() => Ok(value),
        Some(Ok(_)) => Err(serde::de::Error::custom("report is not a JSON object")),
        Some(Err(e)) => Err(e),
        None => Err(serde::de::Error::custom("empty report")),
    }
}

fn has_errors(report: &Value) -> bool {
    report["errors"].as_array().is_some_and(|errors| !errors.is_empty())
}

fn to_item(item: &Value) -> ResultItem {
    let extra = &item["extra"];
    let message = extra["message"].as_str().unwrap_or_default().to_string();
    let severity = extra["severity"].as_str().map(str::to_string);

    let mut converted = Extra::new(message, severity);
    if let Ok(metadata) = serde_json::from_value::<Metadata>(extra["metadata"].clone()) {
        if !metadata.message_zh.is_empty() || !metadata.abstract_feysh.is_empty() {
            converted.metadata = metadata;
        }
    }

    ResultItem {
        check_id: item["check_id"].as_str().unwrap_or_default().to_string(),
        path: item["path"].as_str().unwrap_or_default().to_string(),
        start: position(&item["start"]),
        end: position(&item["end"]),
        extra: converted,
    }
}

fn position(value: &Value) -> Position {
    let field = |name: &str| {
        value[name]
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    };
    Position {
        line: field("line"),
        col: field("col"),
    }
}
