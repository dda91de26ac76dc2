use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn codelens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codelens"))
        .arg("--compact")
        .args(args)
        .output()
        .expect("run codelens")
}

fn envelope(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn empty_file_fails_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = dir.path().join("empty.py");
    fs::write(&file, "").expect("write empty file");

    let output = codelens(&["file", &path_arg(&file)]);
    let value = envelope(&output);

    assert!(!output.status.success());
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("empty content"));
    assert!(value.get("report").is_none());
}

#[test]
fn empty_file_request_fails_the_run() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_codelens"))
        .args(["--compact", "request", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn codelens");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"path":"a.py","content":""}"#)
        .expect("write request");
    let output = child.wait_with_output().expect("wait for codelens");
    let value = envelope(&output);

    assert!(!output.status.success());
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("empty content"));
}

#[test]
fn project_with_no_sources_fails_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let pattern = path_arg(&dir.path().join("*.py"));

    let output = codelens(&["project", &pattern]);
    let value = envelope(&output);

    assert!(!output.status.success());
    assert_eq!(value["success"], json!(false));
    assert!(value["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[test]
fn project_keeps_empty_files_as_exclusions() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("app.py"), "x = 1\n").expect("write app");
    fs::write(dir.path().join("empty.py"), "").expect("write empty");

    let output = codelens(&["project", &path_arg(dir.path())]);
    let value = envelope(&output);

    assert!(output.status.success());
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["report"]["overview"]["analyzedFiles"], json!(1));
    assert_eq!(
        value["report"]["overview"]["excludedFiles"][0]["error"],
        json!("empty content")
    );
}

#[test]
fn analyzed_file_succeeds_with_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = dir.path().join("config.py");
    fs::write(&file, "password = \"abc123\"\n").expect("write file");

    let output = codelens(&["file", &path_arg(&file)]);
    let value = envelope(&output);

    assert!(output.status.success());
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["report"]["path"], json!(path_arg(&file)));
    assert_eq!(value["report"]["detectedLanguage"], json!("Python"));
    assert_eq!(value["report"]["securityIssues"][0]["ruleName"], json!("Hardcoded Credentials"));
    assert!(value.get("error").is_none());
}
