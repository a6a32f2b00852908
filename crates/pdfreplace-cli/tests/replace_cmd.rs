//! Integration tests for the `replace` subcommand.

mod common;

use common::{cmd, page_texts, text_pdf, write_pdf};
use predicates::prelude::*;

#[test]
fn replaces_and_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "letter.pdf", &text_pdf(&["Hello World"]));
    let output = dir.path().join("out.pdf");

    cmd()
        .args(["replace"])
        .arg(&input)
        .args(["--find", "world", "--replace", "there", "-o"])
        .arg(&output)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replacements: 1"))
        .stdout(predicate::str::contains("Detected font: Helvetica"))
        .stdout(predicate::str::contains("Used font:"));

    assert!(output.exists());
    assert!(page_texts(&output)[0].contains("There"));
}

#[test]
fn default_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "memo.pdf", &text_pdf(&["Draft memo"]));

    cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "draft", "--replace", "final"])
        .assert()
        .success()
        .stdout(predicate::str::contains("memo-replaced.pdf"));
    assert!(dir.path().join("memo-replaced.pdf").exists());
}

#[test]
fn json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", &text_pdf(&["one", "one more"]));
    let output = dir.path().join("out.pdf");

    let assert = cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "one", "--replace", "two", "--format", "json", "-o"])
        .arg(&output)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["replacements"], 2);
    assert_eq!(value["diagnostics"]["detectedFont"], "Helvetica");
    assert_eq!(value["diagnostics"]["detectedBold"], false);
    assert!(value["diagnostics"]["usedSource"].is_string());
    assert!(value["output"].as_str().unwrap().ends_with("out.pdf"));
}

#[test]
fn page_range_validation() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", &text_pdf(&["a", "b"]));

    cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "a", "--scope", "range", "--from-page", "1", "--to-page", "5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: toPage must be between 1 and 2"));

    cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "a", "--scope", "some"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scope must be 'all' or 'range'"));
}

#[test]
fn rejects_bad_font_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", &text_pdf(&["abc"]));
    let font = dir.path().join("notes.txt");
    std::fs::write(&font, b"not a font").unwrap();

    cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "abc", "--replace", "xyz", "--font-file"])
        .arg(&font)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be .ttf or .otf"));
}

#[test]
fn missing_file() {
    cmd()
        .args(["replace", "/nonexistent/file.pdf", "--find", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn invalid_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "bad.pdf", b"not a pdf at all");

    cmd()
        .arg("replace")
        .arg(&input)
        .args(["--find", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open PDF"));
}

#[test]
fn verbose_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", &text_pdf(&["Hello"]));

    cmd()
        .args(["-v", "replace"])
        .arg(&input)
        .args(["--find", "hello", "--replace", "bye"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("replacement pass complete"));
}
