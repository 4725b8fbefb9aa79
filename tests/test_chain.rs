mod common;

use std::path::Path;
use std::sync::Arc;

use common::MockScanner;
use sast_dispatch::error::{ErrorKind, ScanError};
use sast_dispatch::scanners::chain::ChainScanner;
use sast_dispatch::scanners::Scanner;

fn dyn_(scanner: &Arc<MockScanner>) -> Arc<dyn Scanner> {
    scanner.clone()
}

// ── first success wins ────────────────────────────────────────────────────────

#[test]
fn first_success_short_circuits() {
    let a = MockScanner::failing("a", "a broke");
    let b = MockScanner::succeeding("b");
    let c = MockScanner::failing("c", "c broke");
    let chain = ChainScanner::new(vec![dyn_(&a), dyn_(&b), dyn_(&c)]);

    let result = chain.scan("task-1", Path::new("/ws"), "java").unwrap();

    assert_eq!(result.prefix, "b");
    assert_eq!(result.id, "task-1");
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 0, "scanners after the first success never run");
}

#[test]
fn leading_success_skips_the_rest() {
    let a = MockScanner::succeeding("a");
    let b = MockScanner::succeeding("b");
    let chain = ChainScanner::new(vec![dyn_(&a), dyn_(&b)]);

    assert_eq!(chain.scan("x", Path::new("/ws"), "go").unwrap().prefix, "a");
    assert_eq!(b.calls(), 0);
}

#[test]
fn arguments_reach_every_attempt() {
    let a = MockScanner::failing("a", "nope");
    let b = MockScanner::succeeding("b");
    let chain = ChainScanner::new(vec![dyn_(&a), dyn_(&b)]);

    chain.scan("x", Path::new("/ws"), "python").unwrap();

    assert_eq!(a.last_rule.lock().unwrap().as_deref(), Some("python"));
    assert_eq!(b.last_rule.lock().unwrap().as_deref(), Some("python"));
}

// ── all fail ──────────────────────────────────────────────────────────────────

#[test]
fn all_failing_reports_only_the_last_error() {
    let chain = ChainScanner::new(vec![
        dyn_(&MockScanner::failing("a", "first failure")),
        dyn_(&MockScanner::failing("b", "second failure")),
    ]);

    let err = chain.scan("x", Path::new("/ws"), "java").unwrap_err();
    let message = err.to_string();

    assert!(message.contains("second failure"), "got: {message}");
    assert!(!message.contains("first failure"), "got: {message}");
    assert_eq!(err.kind(), ErrorKind::AllScannersFailed);
    match err {
        ScanError::AllScannersFailed { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*source, ScanError::ToolInvocationFailed { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_chain_fails() {
    let chain = ChainScanner::new(vec![]);
    assert!(chain.is_empty());

    let err = chain.scan("x", Path::new("/ws"), "java").unwrap_err();
    assert!(matches!(err, ScanError::ChainEmpty), "got {err:?}");
}

// ── composition ───────────────────────────────────────────────────────────────

#[test]
fn chains_nest() {
    let inner_fail = MockScanner::failing("inner-a", "down");
    let inner_ok = MockScanner::succeeding("inner-b");
    let inner: Arc<dyn Scanner> =
        Arc::new(ChainScanner::new(vec![dyn_(&inner_fail), dyn_(&inner_ok)]));
    let outer_fail = MockScanner::failing("outer", "down");

    let chain = ChainScanner::new(vec![dyn_(&outer_fail), inner]);
    assert_eq!(chain.len(), 2);

    let result = chain.scan("nested", Path::new("/ws"), "java").unwrap();
    assert_eq!(result.prefix, "inner-b");
    assert_eq!(outer_fail.calls(), 1);
    assert_eq!(inner_fail.calls(), 1);
}

#[test]
fn nested_failure_is_wrapped_twice() {
    let root = MockScanner::failing("inner", "root cause");
    let inner: Arc<dyn Scanner> = Arc::new(ChainScanner::new(vec![dyn_(&root)]));
    let chain = ChainScanner::new(vec![inner]);

    let err = chain.scan("x", Path::new("/ws"), "java").unwrap_err();
    assert!(err.to_string().contains("root cause"));
    assert!(!err.is_client_error());
}
