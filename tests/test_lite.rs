mod common;

use std::ffi::OsString;
use std::sync::Arc;

use common::{exit, fixture, ok, FakeRunner};
use sast_dispatch::config::LiteConfig;
use sast_dispatch::error::ScanError;
use sast_dispatch::scanners::lite::LightweightEngine;
use sast_dispatch::scanners::Scanner;

fn engine(runner: Arc<FakeRunner>) -> LightweightEngine {
    LightweightEngine::new(LiteConfig::default(), runner)
}

// ── invocation ────────────────────────────────────────────────────────────────

#[test]
fn runs_scan_with_rule_selector() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| ok(r#"{"results":[]}"#));

    engine(runner.clone()).scan("t", ws.path(), "java").unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "semgrep");
    let args = &calls[0].args;
    assert_eq!(
        args[..5],
        [
            OsString::from("scan"),
            OsString::from("--json"),
            OsString::from("--quiet"),
            OsString::from("--config"),
            OsString::from("p/java"),
        ]
    );
    assert_eq!(args[5].as_os_str(), ws.path().as_os_str());
}

#[test]
fn custom_template_and_program_are_honoured() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| ok(r#"{"results":[]}"#));
    let config = LiteConfig {
        program: "/usr/local/bin/opengrep".to_string(),
        prefix: "opengrep".to_string(),
        rule_template: "/rules/{rule}.yml".to_string(),
        ..LiteConfig::default()
    };

    let result = LightweightEngine::new(config, runner.clone())
        .scan("t", ws.path(), "go")
        .unwrap();

    assert_eq!(result.prefix, "opengrep");
    let calls = runner.calls();
    assert_eq!(calls[0].program, "/usr/local/bin/opengrep");
    assert_eq!(calls[0].args[4], OsString::from("/rules/go.yml"));
}

#[test]
fn missing_workspace_runs_nothing() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| ok(r#"{"results":[]}"#));

    let err = engine(runner.clone())
        .scan("t", &ws.path().join("gone"), "java")
        .unwrap_err();

    assert!(matches!(err, ScanError::WorkspaceNotFound { .. }), "got {err:?}");
    assert!(runner.calls().is_empty());
}

// ── report conversion ─────────────────────────────────────────────────────────

#[test]
fn report_is_normalized_and_stamped() {
    let ws = tempfile::tempdir().unwrap();
    let report = fixture("semgrep-output.json").replace("/ws", &ws.path().display().to_string());
    let runner = FakeRunner::new(move |_| ok(&report));

    let result = engine(runner).scan("task-7", ws.path(), "java").unwrap();

    assert_eq!(result.id, "task-7");
    assert_eq!(result.prefix, "semgrep");
    assert!(result.output.contains("jdbc-sqli"), "raw output is kept");
    assert_eq!(result.results.len(), 2, "finding without check_id is dropped");

    let sqli = &result.results[0];
    assert_eq!(sqli.check_id, "java.lang.security.audit.sqli.jdbc-sqli");
    assert_eq!(sqli.path, "src/main/java/UserDao.java");
    assert_eq!((sqli.start.line, sqli.start.col), (42, 17));
    assert_eq!((sqli.end.line, sqli.end.col), (42, 80));
    assert_eq!(sqli.extra.severity, "ERROR");
    assert_eq!(
        sqli.extra.metadata.message_zh,
        "Detected a formatted string in a SQL statement",
        "foreign metadata is replaced by the locale bag"
    );

    let weak = &result.results[1];
    assert_eq!(weak.path, "src/main/java/Auth.java");
    assert_eq!(weak.extra.severity, "WARNING");
}

#[test]
fn report_without_results_is_empty() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| ok(r#"{"errors":[]}"#));

    let result = engine(runner).scan("t", ws.path(), "java").unwrap();
    assert!(result.results.is_empty());
}

// ── exit codes ────────────────────────────────────────────────────────────────

#[test]
fn parsable_report_wins_over_nonzero_exit() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| {
        exit(
            1,
            r#"{"results":[{"check_id":"r","path":"a.py","extra":{"message":"m"}}]}"#,
        )
    });

    let result = engine(runner).scan("t", ws.path(), "python").unwrap();
    assert_eq!(result.results.len(), 1);
}

#[test]
fn fatal_exit_with_reported_errors_is_an_invocation_failure() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| {
        exit(
            7,
            r#"{"errors":[{"code":7,"level":"error","message":"Invalid rule config p/java"}],"results":[]}"#,
        )
    });

    let err = engine(runner).scan("t", ws.path(), "java").unwrap_err();

    match &err {
        ScanError::ToolInvocationFailed { reason, output, .. } => {
            assert_eq!(reason, "exit status 7");
            assert!(output.contains("Invalid rule config"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reported_errors_with_zero_exit_still_succeed() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| {
        ok(r#"{"errors":[{"level":"warn","message":"skipped a.min.js"}],"results":[]}"#)
    });

    let result = engine(runner).scan("t", ws.path(), "javascript").unwrap();
    assert!(result.results.is_empty());
}

#[test]
fn garbage_with_nonzero_exit_is_an_invocation_failure() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| exit(2, "semgrep: invalid configuration"));

    let err = engine(runner).scan("t", ws.path(), "java").unwrap_err();

    match &err {
        ScanError::ToolInvocationFailed { output, .. } => {
            assert!(output.contains("invalid configuration"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn garbage_with_zero_exit_is_a_parse_failure() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| ok("not json at all"));

    let err = engine(runner).scan("t", ws.path(), "java").unwrap_err();
    assert!(matches!(err, ScanError::ReportParseFailed { .. }), "got {err:?}");
    assert!(err.to_string().contains("semgrep stdout"));
}

#[test]
fn spawn_failure_is_an_invocation_failure() {
    let ws = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new(|_| {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        ))
    });

    let err = engine(runner).scan("t", ws.path(), "java").unwrap_err();
    assert!(matches!(err, ScanError::ToolInvocationFailed { .. }), "got {err:?}");
    assert!(err.to_string().contains("No such file or directory"));
}
