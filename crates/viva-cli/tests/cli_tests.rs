//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn viva() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("viva").unwrap()
}

const QUESTION_FILE: &str = r#"[[questions]]
id = "q1"
text = "How do you total A1:A10?"
category = "formula"
difficulty = "basic"
expected_answers = ["=SUM(A1:A10)"]
keywords = ["sum"]
time_limit_secs = 120

[[questions]]
id = "q2"
text = "How do you find the largest value in B1:B20?"
category = "function"
difficulty = "basic"
expected_answers = ["=MAX(B1:B20)"]
keywords = ["max"]
time_limit_secs = 120
"#;

#[test]
fn validate_question_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    std::fs::write(&path, QUESTION_FILE).unwrap();

    viva()
        .arg("validate")
        .arg("--questions")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 question(s)"))
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn validate_warns_on_missing_keywords() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    std::fs::write(
        &path,
        r#"[[questions]]
id = "bare"
text = "Describe a chart."
category = "chart"
difficulty = "basic"
"#,
    )
    .unwrap();

    viva()
        .arg("validate")
        .arg("--questions")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("no keywords"));
}

#[test]
fn validate_rejects_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    let duplicated = format!("{QUESTION_FILE}\n{QUESTION_FILE}");
    std::fs::write(&path, duplicated).unwrap();

    viva()
        .arg("validate")
        .arg("--questions")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate"));
}

#[test]
fn validate_nonexistent_file() {
    viva()
        .arg("validate")
        .arg("--questions")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn questions_shows_builtin_bank() {
    viva()
        .arg("questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question bank"))
        .stdout(predicate::str::contains("basic"))
        .stdout(predicate::str::contains("advanced"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    viva()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created viva.toml"))
        .stdout(predicate::str::contains("Created questions/example.toml"));

    assert!(dir.path().join("viva.toml").exists());
    assert!(dir.path().join("questions/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    viva()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    viva()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_validates() {
    let dir = TempDir::new().unwrap();

    viva().current_dir(dir.path()).arg("init").assert().success();

    viva()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--questions")
        .arg("questions/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn run_with_mock_judge_over_stdin() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("transcript.json");

    // Seven strong answers cover the longest possible session.
    let answers = vec![
        "First I would use the formula =SUM(A1:A10) because it totals the range directly";
        7
    ]
    .join("\n");

    viva()
        .current_dir(dir.path())
        .arg("run")
        .arg("--candidate")
        .arg("Test Candidate")
        .arg("--mock")
        .arg("--seed")
        .arg("7")
        .arg("--export")
        .arg(&export)
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi Test Candidate!"))
        .stdout(predicate::str::contains("Question 1 of up to 7"))
        .stdout(predicate::str::contains("Session complete"));

    let transcript = std::fs::read_to_string(&export).unwrap();
    let json: serde_json::Value = serde_json::from_str(&transcript).unwrap();
    assert_eq!(json["state"]["candidate_name"], "Test Candidate");
    assert_eq!(json["state"]["completed"], true);
}

#[test]
fn help_output() {
    viva()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adaptive skills interview engine"));
}

#[test]
fn version_output() {
    viva()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("viva"));
}
