//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sast_dispatch::error::ScanError;
use sast_dispatch::finding::{Extra, ResultItem, ScanResult};
use sast_dispatch::process::{CommandRunner, Invocation, ProcessOutput};
use sast_dispatch::scanners::Scanner;

type Handler = dyn Fn(&Invocation) -> io::Result<ProcessOutput> + Send + Sync;

/// [`CommandRunner`] that records every invocation and answers from a closure.
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    handler: Box<Handler>,
}

impl FakeRunner {
    pub fn new(
        handler: impl Fn(&Invocation) -> io::Result<ProcessOutput> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(FakeRunner {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.handler)(invocation)
    }
}

pub fn exit(code: i32, output: &str) -> io::Result<ProcessOutput> {
    Ok(ProcessOutput {
        code: Some(code),
        output: output.as_bytes().to_vec(),
    })
}

pub fn ok(output: &str) -> io::Result<ProcessOutput> {
    exit(0, output)
}

/// The scratch directory is the last positional argument of the analysis
/// invocation.
pub fn scratch_of(invocation: &Invocation) -> PathBuf {
    PathBuf::from(invocation.args.last().expect("scratch argument"))
}

/// Writes `(relative path, contents)` reports under `<scratch>/sarif`.
pub fn write_reports(invocation: &Invocation, reports: &[(&str, &str)]) {
    let dir = scratch_of(invocation).join("sarif");
    for (name, contents) in reports {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(Path::new("tests/fixtures").join(name)).unwrap()
}

pub fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Scanner with a canned outcome and a call counter.
pub struct MockScanner {
    pub label: &'static str,
    pub fail_with: Option<&'static str>,
    pub calls: AtomicUsize,
    pub last_rule: Mutex<Option<String>>,
}

impl MockScanner {
    pub fn succeeding(label: &'static str) -> Arc<Self> {
        Arc::new(MockScanner {
            label,
            fail_with: None,
            calls: AtomicUsize::new(0),
            last_rule: Mutex::new(None),
        })
    }

    pub fn failing(label: &'static str, message: &'static str) -> Arc<Self> {
        Arc::new(MockScanner {
            label,
            fail_with: Some(message),
            calls: AtomicUsize::new(0),
            last_rule: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scanner for MockScanner {
    fn scan(&self, id: &str, workspace: &Path, rule: &str) -> Result<ScanResult, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_rule.lock().unwrap() = Some(rule.to_string());

        if let Some(message) = self.fail_with {
            return Err(ScanError::ToolInvocationFailed {
                program: self.label.to_string(),
                reason: message.to_string(),
                output: String::new(),
            });
        }

        let result = ScanResult {
            results: vec![ResultItem {
                check_id: format!("{}/rule", self.label),
                path: workspace.display().to_string(),
                extra: Extra::new("found".to_string(), None),
                ..ResultItem::default()
            }],
            ..ScanResult::empty()
        };
        Ok(result.finalize(id, self.label, String::new()))
    }

    fn name(&self) -> &str {
        self.label
    }
}
