//! Request dispatch.
//!
//! [`Dispatcher::dispatch`] is the in-process entry point: it resolves a
//! scanner for the request's language and mode, runs it, and logs the
//! outcome. [`Dispatcher::dispatch_all`] fans several independent requests
//! out over [rayon]; each request still runs synchronously on its own
//! worker.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::ScanError;
use crate::finding::ScanResult;
use crate::registry::{Language, Mode, ScannerRegistry};

/// One scan request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScanRequest {
    pub id: String,
    pub language: Language,
    pub mode: Mode,
    pub workspace: PathBuf,
}

/// Resolves and runs scanners for requests.
pub struct Dispatcher {
    registry: ScannerRegistry,
}

impl Dispatcher {
    pub fn new(registry: ScannerRegistry) -> Self {
        Dispatcher { registry }
    }

    pub fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    /// Runs a single request.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoScannerRegistered`] when nothing can serve the
    /// (language, mode) pair; otherwise whatever the resolved scanner
    /// returns.
    pub fn dispatch(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let scanner = self
            .registry
            .resolve(request.language, request.mode)
            .ok_or(ScanError::NoScannerRegistered {
                language: request.language,
                mode: request.mode,
            })?;

        tracing::debug!(
            id = %request.id,
            language = %request.language,
            mode = %request.mode,
            scanner = scanner.name(),
            "dispatching scan"
        );

        match scanner.scan(&request.id, &request.workspace, request.language.rule()) {
            Ok(result) => {
                tracing::info!(
                    id = %request.id,
                    prefix = %result.prefix,
                    findings = result.results.len(),
                    "task done"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(id = %request.id, kind = %e.kind(), error = %e, "failed to scan");
                Err(e)
            }
        }
    }

    /// Runs independent requests in parallel; results keep request order.
    pub fn dispatch_all(&self, requests: &[ScanRequest]) -> Vec<Result<ScanResult, ScanError>> {
        requests.par_iter().map(|r| self.dispatch(r)).collect()
    }
}
