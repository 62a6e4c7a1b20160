//! Driver tests against real child processes
//!
//! Each test writes a throwaway shell script that stands in for the
//! calculator binary.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use apcfuzz::{Driver, Error, Harness, HarnessConfig, ProcessSubject, Subject};
use tempfile::TempDir;

fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn expression_is_the_only_argument() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "apc", r#"echo "argc=$#"; echo "$1 = 7""#);
    let subject = ProcessSubject::new(&path);
    let raw = subject.invoke("3 + 4").unwrap();
    assert_eq!(raw, "argc=1\n3 + 4 = 7\n");

    let driver = Driver::new(subject, 0).unwrap();
    assert_eq!(driver.evaluate("3 + 4").unwrap(), "7");
}

#[test]
fn answer_line_offset_from_end() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "apc", r#"echo "$1 = 12"; echo; echo "bye""#);
    let driver = Driver::new(ProcessSubject::new(&path), 1).unwrap();
    assert_eq!(driver.evaluate("(3)(4)").unwrap(), "12");
}

#[test]
fn silent_process_is_an_invocation_error() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "apc", "echo oops >&2; exit 3");
    let err = ProcessSubject::new(&path).invoke("1").unwrap_err();
    match err {
        Error::Invocation(message) => assert!(message.contains("oops"), "{message}"),
        other => panic!("expected invocation error, got {other:?}"),
    }
}

#[test]
fn error_text_is_a_malformed_reply() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "apc", r#"echo "$1 = syntax error""#);
    let driver = Driver::new(ProcessSubject::new(&path), 0).unwrap();
    assert!(matches!(driver.evaluate("1 +"), Err(Error::ResultParse { .. })));
}

#[test]
fn harness_runs_against_a_process() {
    let dir = TempDir::new().unwrap();
    // Always answers zero: passes only when the expected value is zero.
    let path = script(&dir, "apc", r#"echo "$1 = 0""#);
    let config = HarnessConfig::default().subject(&path);
    let harness = Harness::new(ProcessSubject::new(&config.subject), &config).unwrap();
    let outcome = harness.run_numerals(3, 10, |_| {}).unwrap();
    assert_eq!(outcome.statistics.overall.total, 10);
    for failure in &outcome.failures {
        assert_ne!(failure.expected, "0");
    }
}
