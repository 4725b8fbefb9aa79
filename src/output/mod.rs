//! Output formatting for scan results.
//!
//! | Format | Module | Use case |
//! |--------|--------|----------|
//! | [`Pretty`](OutputFormat::Pretty) | [`pretty`] | Terminal / human review |
//! | [`Json`](OutputFormat::Json)     | [`json`]   | The canonical result schema |
//! | [`Sarif`](OutputFormat::Sarif)   | [`sarif`]  | CI/CD integration |

pub mod json;
pub mod pretty;
pub mod sarif;

use crate::finding::ScanResult;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text.
    Pretty,
    /// Canonical result JSON.
    Json,
    /// [SARIF 2.1.0](https://sarifweb.azurewebsites.net/).
    Sarif,
}

/// Formats a [`ScanResult`] in the requested [`OutputFormat`].
pub fn format_result(result: &ScanResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::format(result),
        OutputFormat::Json => json::format(result),
        OutputFormat::Sarif => sarif::format(result),
    }
}
