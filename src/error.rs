//! Error taxonomy for scan dispatch.
//!
//! Every failure a scan can produce is a [`ScanError`] variant. Variants are
//! matched by kind (see [`ScanError::kind`]) so a caller, or a
//! [`ChainScanner`](crate::scanners::chain::ChainScanner), can decide whether
//! to fall back to another engine or report a client error.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::registry::{Language, Mode};

/// Failure of a single scan invocation.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The workspace path handed to a scanner does not exist.
    #[error("failed to stat workspace {}: {source}", path.display())]
    WorkspaceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project's native build step failed to start or exited non-zero.
    #[error("failed to build {tool} project: {reason} out: {output}")]
    BuildFailed {
        tool: &'static str,
        reason: String,
        output: String,
    },

    /// The per-invocation scratch directory could not be created.
    #[error("failed to create scratch directory: {0}")]
    ScratchSpace(#[source] io::Error),

    /// The analysis binary failed to start, timed out, or exited non-zero.
    #[error("failed to run {program}: {reason} out: {output}")]
    ToolInvocationFailed {
        program: String,
        reason: String,
        output: String,
    },

    /// A report (SARIF file or engine stdout) was not valid JSON of the
    /// expected shape.
    #[error("failed to parse report {report}: {source}")]
    ReportParseFailed {
        report: String,
        #[source]
        source: serde_json::Error,
    },

    /// A report file or the report directory could not be read.
    #[error("failed to read report {}: {source}", path.display())]
    ReportUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No scanner is registered for the requested language and mode.
    #[error("unknown scanner for language: {language} and mode: {mode}")]
    NoScannerRegistered { language: Language, mode: Mode },

    /// Every scanner in a chain failed; carries the last failure.
    #[error("all scanners failed: {source}")]
    AllScannersFailed {
        attempts: usize,
        #[source]
        source: Box<ScanError>,
    },

    /// A chain was built without any scanners.
    #[error("scanner chain has no scanners")]
    ChainEmpty,
}

/// Discriminant of a [`ScanError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WorkspaceNotFound,
    BuildFailed,
    ScratchSpace,
    ToolInvocationFailed,
    ReportParseFailed,
    ReportUnreadable,
    NoScannerRegistered,
    AllScannersFailed,
    ChainEmpty,
}

impl ErrorKind {
    /// Stable snake_case label, suitable for logs and machine output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::WorkspaceNotFound => "workspace_not_found",
            ErrorKind::BuildFailed => "build_failed",
            ErrorKind::ScratchSpace => "scratch_space",
            ErrorKind::ToolInvocationFailed => "tool_invocation_failed",
            ErrorKind::ReportParseFailed => "report_parse_failed",
            ErrorKind::ReportUnreadable => "report_unreadable",
            ErrorKind::NoScannerRegistered => "no_scanner_registered",
            ErrorKind::AllScannersFailed => "all_scanners_failed",
            ErrorKind::ChainEmpty => "chain_empty",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::WorkspaceNotFound { .. } => ErrorKind::WorkspaceNotFound,
            ScanError::BuildFailed { .. } => ErrorKind::BuildFailed,
            ScanError::ScratchSpace(_) => ErrorKind::ScratchSpace,
            ScanError::ToolInvocationFailed { .. } => ErrorKind::ToolInvocationFailed,
            ScanError::ReportParseFailed { .. } => ErrorKind::ReportParseFailed,
            ScanError::ReportUnreadable { .. } => ErrorKind::ReportUnreadable,
            ScanError::NoScannerRegistered { .. } => ErrorKind::NoScannerRegistered,
            ScanError::AllScannersFailed { .. } => ErrorKind::AllScannersFailed,
            ScanError::ChainEmpty => ErrorKind::ChainEmpty,
        }
    }

    /// Returns `true` when the request itself was bad rather than an engine
    /// failing: the workspace is missing or nothing can scan the
    /// (language, mode) pair.
    ///
    /// A chain whose last failure was a client error is a client error too.
    pub fn is_client_error(&self) -> bool {
        match self {
            ScanError::WorkspaceNotFound { .. } | ScanError::NoScannerRegistered { .. } => true,
            ScanError::AllScannersFailed { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
