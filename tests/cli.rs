//! Integration tests for the gecmark CLI. Every test runs against its own
//! data and config directories so installed dictionaries never leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const WORDS: &str = "the\ncat\nsat\non\nmat\nis\nhappy\n";

fn gecmark(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gecmark").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("GECMARK_ENGINE_URL")
        .arg("--no-color");
    cmd
}

/// A home directory with a small en_US dictionary installed.
fn home_with_dictionary() -> TempDir {
    let home = TempDir::new().unwrap();
    let words = home.path().join("words.txt");
    fs::write(&words, WORDS).unwrap();

    gecmark(&home)
        .args(["dict", "build", "en_US"])
        .arg(&words)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dictionary installed"));
    home
}

#[test]
fn test_misspelling_reported_and_fails() {
    let home = home_with_dictionary();
    let file = home.path().join("note.txt");
    fs::write(&file, "Teh cat sat.").unwrap();

    gecmark(&home)
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "1:1 spelling \"Teh\" Possible spelling mistake found.",
        ))
        .stdout(predicate::str::contains("1 issue found in 1 input"));
}

#[test]
fn test_no_fail_and_clean_input() {
    let home = home_with_dictionary();
    let clean = home.path().join("clean.txt");
    let dirty = home.path().join("dirty.txt");
    fs::write(&clean, "The cat sat on the mat.").unwrap();
    fs::write(&dirty, "The cat sta.").unwrap();

    gecmark(&home)
        .arg(&clean)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found in 1 input"));

    gecmark(&home)
        .arg("--no-fail")
        .arg(&dirty)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sta\""));
}

#[test]
fn test_json_output() {
    let home = home_with_dictionary();
    let file = home.path().join("note.txt");
    fs::write(&file, "The cat is hapy.").unwrap();

    let output = gecmark(&home)
        .args(["--format", "json", "--no-fail"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["files_checked"], 1);
    assert_eq!(value["total_issues"], 1);
    let markup = &value["files"][0]["text_markups"][0];
    assert_eq!(markup["index"], 11);
    assert_eq!(markup["length"], 4);
    assert_eq!(markup["category"], "SPELLING");
    assert_eq!(value["files"][0]["character_count"], 16);
}

#[test]
fn test_stdin_and_directory_inputs() {
    let home = home_with_dictionary();
    let docs = home.path().join("docs");
    fs::create_dir_all(docs.join("nested")).unwrap();
    fs::write(docs.join("a.txt"), "The cat sat.").unwrap();
    fs::write(docs.join("nested").join("b.txt"), "The mat is happy.").unwrap();
    fs::write(docs.join(".hidden"), "Zzz qqq.").unwrap();

    gecmark(&home)
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found in 2 inputs"));

    gecmark(&home)
        .arg("-")
        .write_stdin("The cat sat on teh mat.")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1:16 spelling \"teh\""));
}

#[test]
fn test_disabled_spelling() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("note.txt");
    fs::write(&file, "Teh cat sat.").unwrap();

    gecmark(&home)
        .args(["--no-spelling", "--no-gibberish"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_profanity_list() {
    let home = home_with_dictionary();
    let list = home.path().join("bad.txt");
    let file = home.path().join("note.txt");
    fs::write(&list, "darn\n").unwrap();
    fs::write(&file, "The darn cat.").unwrap();

    gecmark(&home)
        .arg("--profanity-list")
        .arg(&list)
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("profanity \"darn\""));
}

#[test]
fn test_segment_command() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("note.txt");
    fs::write(&file, "Hi there. Bye now.\n\nNext.").unwrap();

    gecmark(&home)
        .arg("segment")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("sentence Hi there."))
        .stdout(predicate::str::contains("break    \\n\\n"))
        .stdout(predicate::str::contains("   20    5 sentence Next."));
}

#[test]
fn test_request_command() {
    let home = TempDir::new().unwrap();

    gecmark(&home)
        .args(["--no-spelling", "request"])
        .write_stdin(r#"{"text": "Hello there."}"#)
        .assert()
        .success()
        .stderr(predicate::str::contains("200"))
        .stdout(predicate::str::contains("\"corrected_text\":\"Hello there.\""));

    gecmark(&home)
        .args(["--no-spelling", "request", "--method", "GET", "--path", "/healthCheck"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));

    gecmark(&home)
        .args(["--no-spelling", "request"])
        .write_stdin(r#"{"text": ""}"#)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("400"));
}

#[test]
fn test_dict_info_and_list() {
    let home = home_with_dictionary();

    gecmark(&home)
        .args(["dict", "info", "en_US"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Words: 7"))
        .stdout(predicate::str::contains("SHA-256:"));

    gecmark(&home)
        .args(["dict", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en_US"));
}

#[test]
fn test_bad_invocations() {
    let home = TempDir::new().unwrap();

    gecmark(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files specified"));

    gecmark(&home)
        .args(["--config", "missing.toml", "x.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));

    gecmark(&home)
        .args(["--format", "xml", "x.txt"])
        .assert()
        .failure();
}

#[test]
fn test_completion() {
    let home = TempDir::new().unwrap();
    gecmark(&home)
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gecmark"));
}
