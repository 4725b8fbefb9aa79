//! Ordered fallback across several scanners.

use std::path::Path;
use std::sync::Arc;

use crate::error::ScanError;
use crate::finding::ScanResult;
use crate::scanners::Scanner;

/// A [`Scanner`] that tries each sub-scanner in order and returns the first
/// success.
///
/// Sub-scanners run strictly sequentially; once one succeeds the rest are
/// never invoked. When all fail, the error wraps the **last** failure only.
/// Earlier failures are logged as they happen.
pub struct ChainScanner {
    scanners: Vec<Arc<dyn Scanner>>,
}

impl ChainScanner {
    pub fn new(scanners: Vec<Arc<dyn Scanner>>) -> Self {
        ChainScanner { scanners }
    }

    pub fn len(&self) -> usize {
        self.scanners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }
}

impl Scanner for ChainScanner {
    fn scan(&self, id: &str, workspace: &Path, rule: &str) -> Result<ScanResult, ScanError> {
        let mut last_err = None;

        for (position, scanner) in self.scanners.iter().enumerate() {
            match scanner.scan(id, workspace, rule) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        id,
                        scanner = scanner.name(),
                        position,
                        kind = %e.kind(),
                        error = %e,
                        "scanner failed, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(ScanError::AllScannersFailed {
                attempts: self.scanners.len(),
                source: Box::new(e),
            }),
            None => Err(ScanError::ChainEmpty),
        }
    }

    fn name(&self) -> &str {
        "chain"
    }
}
