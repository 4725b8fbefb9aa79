//! Interchangeable scan engines.
//!
//! Every engine implements the single-method [`Scanner`] trait, and so does
//! the composite [`chain::ChainScanner`]. That is what lets a chain be
//! registered in the [`ScannerRegistry`](crate::registry::ScannerRegistry)
//! exactly like a leaf engine, or nested inside another chain.
//!
//! | Scanner | External tool | Build step |
//! |---------|---------------|------------|
//! | [`build_aware::BuildAwareEngine`] | deep-analysis launcher script | Maven / Gradle |
//! | [`lite::LightweightEngine`] | semgrep-compatible binary | none |
//! | [`chain::ChainScanner`] | (composite) | (delegated) |

pub mod build_aware;
pub mod chain;
pub mod lite;

use std::path::Path;

use crate::error::ScanError;
use crate::finding::ScanResult;

/// A unit of work that can scan a workspace.
///
/// Implementers **must** be [`Send`] + [`Sync`]: one instance serves every
/// request resolved to it, possibly from several threads at once.
///
/// # Implementing a custom scanner
///
/// ```rust,ignore
/// use sast_dispatch::scanners::Scanner;
///
/// pub struct MyScanner;
///
/// impl Scanner for MyScanner {
///     fn scan(&self, id: &str, workspace: &Path, rule: &str) -> Result<ScanResult, ScanError> {
///         // ... run the engine, then:
///         Ok(ScanResult::empty().finalize(id, "my-engine", String::new()))
///     }
///
///     fn name(&self) -> &str {
///         "my-engine"
///     }
/// }
/// ```
pub trait Scanner: Send + Sync {
    /// Scans `workspace`.
    ///
    /// `id` must be echoed verbatim into [`ScanResult::id`]. `rule` is an
    /// opaque, engine-specific rule selector.
    fn scan(&self, id: &str, workspace: &Path, rule: &str) -> Result<ScanResult, ScanError>;

    /// Short label used in logs, usually the provenance tag.
    fn name(&self) -> &str;
}

/// Fails with [`ScanError::WorkspaceNotFound`] unless `workspace` exists.
pub fn ensure_workspace(workspace: &Path) -> Result<(), ScanError> {
    std::fs::metadata(workspace)
        .map(|_| ())
        .map_err(|source| ScanError::WorkspaceNotFound {
            path: workspace.to_path_buf(),
            source,
        })
}

/// Shared finalization: drop findings without a rule id, make paths
/// workspace-relative, then stamp provenance.
pub(crate) fn finish(
    mut result: ScanResult,
    id: &str,
    prefix: &str,
    workspace: &Path,
    output: String,
) -> ScanResult {
    let dropped = result.drop_unidentified();
    if dropped > 0 {
        tracing::warn!(id, prefix, dropped, "dropped findings without a rule id");
    }
    result.relativize_paths(workspace);
    // Engines report absolute, resolved paths; a relative or symlinked
    // workspace only matches them in canonical form.
    if let Ok(canonical) = workspace.canonicalize() {
        if canonical != workspace {
            result.relativize_paths(&canonical);
        }
    }
    result.finalize(id, prefix, output)
}
