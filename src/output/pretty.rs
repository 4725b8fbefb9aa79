//! Human-readable colored text formatter.

use colored::Colorize;

use crate::finding::{ResultItem, ScanResult};

/// Formats a [`ScanResult`] as human-readable, ANSI-colored text.
///
/// Sections rendered (in order):
/// 1. **Header** — request id, engine, and render timestamp.
/// 2. **Findings** — one entry per finding with severity, rule, location.
/// 3. **Summary** — total and per-severity counts.
pub fn format(result: &ScanResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        format!("  Scan: {}  ", result.id).bold().on_blue().white()
    ));
    out.push_str(&format!("  Engine:    {}\n", result.prefix));
    out.push_str(&format!("  Timestamp: {}\n\n", chrono::Utc::now().to_rfc3339()));

    if !result.results.is_empty() {
        out.push_str(&format!("{}\n", "Findings".bold().underline()));
        for item in &result.results {
            out.push_str(&format!(
                "  [{severity}] {check_id:<25} {message}\n",
                severity = severity_label(&item.extra.severity),
                check_id = item.check_id.dimmed(),
                message = item.extra.message,
            ));
            let location = location(item);
            if !location.is_empty() {
                out.push_str(&format!("         {}\n", location.dimmed()));
            }
        }
        out.push('\n');
    }

    let tally = result
        .count_by_severity()
        .iter()
        .map(|(severity, n)| format!("{n} {}", severity.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ");

    let status = if result.results.is_empty() {
        "CLEAN".green().bold().to_string()
    } else {
        "FINDINGS".yellow().bold().to_string()
    };

    out.push_str(&format!(
        "Result: {status}  |  {} findings{}\n",
        result.results.len(),
        if tally.is_empty() {
            String::new()
        } else {
            format!(" ({tally})")
        },
    ));

    out
}

/// Colors a pass-through severity label. Unknown vocabularies are shown as-is.
fn severity_label(severity: &str) -> String {
    let label = format!("{:>7}", severity.to_uppercase());
    match severity.to_ascii_lowercase().as_str() {
        "error" | "critical" | "high" => label.red().bold().to_string(),
        "warning" | "medium" => label.yellow().bold().to_string(),
        "note" | "info" | "low" => label.blue().to_string(),
        _ => label,
    }
}

fn location(item: &ResultItem) -> String {
    match (item.path.as_str(), item.start.line) {
        ("", _) => String::new(),
        (path, 0) => path.to_string(),
        (path, line) if item.start.col > 0 => format!("{path}:{line}:{}", item.start.col),
        (path, line) => format!("{path}:{line}"),
    }
}
