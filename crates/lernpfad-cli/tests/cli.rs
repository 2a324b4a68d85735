//! Integration tests driving the `lernpfad` binary over the shared
//! fixtures. State and profile files are copied into per-test temp
//! directories so the fixtures stay pristine.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from("../../tests/fixtures").join(name)
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lernpfad_cli_{}_{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn recommend_prints_a_recommendation_record() {
    let dir = temp_dir("recommend");
    let state_file = dir.join("state.json");

    let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
    cmd.args([
        "recommend",
        "--catalog",
        fixture("catalog.sample.json").to_str().expect("utf-8 path"),
        "--student",
        fixture("student.sample.json").to_str().expect("utf-8 path"),
        "--topics",
        fixture("topics.sample.json").to_str().expect("utf-8 path"),
        "--state-file",
        state_file.to_str().expect("utf-8 path"),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("content_id").and(predicate::str::contains("components")));

    // The session state must have been persisted with advanced counters.
    let state = fs::read_to_string(&state_file).expect("state written");
    assert!(state.contains("time_step"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn recommend_is_deterministic_for_identical_inputs() {
    let dir = temp_dir("determinism");

    let run = |state: &str| -> String {
        let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
        cmd.args([
            "recommend",
            "--catalog",
            fixture("catalog.sample.json").to_str().expect("utf-8 path"),
            "--student",
            fixture("student.sample.json").to_str().expect("utf-8 path"),
            "--state-file",
            dir.join(state).to_str().expect("utf-8 path"),
        ]);
        let output = cmd.assert().success().get_output().stdout.clone();
        String::from_utf8_lossy(&output).into_owned()
    };

    let first = run("state_a.json");
    let second = run("state_b.json");
    assert_eq!(first, second);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn observe_updates_profile_and_reports_mastery() {
    let dir = temp_dir("observe");
    let student_file = dir.join("student.json");
    fs::copy(fixture("student.sample.json"), &student_file).expect("copy student fixture");
    let stats_file = dir.join("stats.json");

    let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
    cmd.args([
        "observe",
        "--student",
        student_file.to_str().expect("utf-8 path"),
        "--catalog",
        fixture("catalog.sample.json").to_str().expect("utf-8 path"),
        "--observations",
        fixture("observations.sample.jsonl")
            .to_str()
            .expect("utf-8 path"),
        "--stats-file",
        stats_file.to_str().expect("utf-8 path"),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fractions").and(predicate::str::contains("correct")));

    // Three correct and one incorrect fraction observations move mastery
    // well above the fixture's 0.3.
    let updated = fs::read_to_string(&student_file).expect("student rewritten");
    let student: serde_json::Value = serde_json::from_str(&updated).expect("valid JSON");
    let mastery = student["mastery_by_topic"]["fractions"]
        .as_f64()
        .expect("fractions mastery present");
    assert!(mastery > 0.3);
    assert_eq!(student["total_interactions"].as_u64(), Some(7));

    let stats = fs::read_to_string(&stats_file).expect("stats written");
    assert!(stats.contains("by_kind"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn observe_skips_unknown_content_with_warning() {
    let dir = temp_dir("observe_unknown");
    let student_file = dir.join("student.json");
    fs::copy(fixture("student.sample.json"), &student_file).expect("copy student fixture");
    let observations = dir.join("observations.jsonl");
    fs::write(
        &observations,
        r#"{"content_id":"ghost-item","topic":"fractions","correct":true}"#,
    )
    .expect("write observations");

    let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
    cmd.args([
        "observe",
        "--student",
        student_file.to_str().expect("utf-8 path"),
        "--catalog",
        fixture("catalog.sample.json").to_str().expect("utf-8 path"),
        "--observations",
        observations.to_str().expect("utf-8 path"),
        "--stats-file",
        dir.join("stats.json").to_str().expect("utf-8 path"),
    ]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unknown content"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn simulate_is_reproducible_with_a_seed() {
    let run = || -> String {
        let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
        cmd.args([
            "simulate",
            "--catalog",
            fixture("catalog.sample.json").to_str().expect("utf-8 path"),
            "--student",
            fixture("student.sample.json").to_str().expect("utf-8 path"),
            "--steps",
            "6",
            "--seed",
            "7",
        ]);
        let output = cmd.assert().success().get_output().stdout.clone();
        String::from_utf8_lossy(&output).into_owned()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(first.contains("final mastery"));
}

#[test]
fn empty_catalog_fails_with_a_clear_error() {
    let dir = temp_dir("empty_catalog");
    let catalog = dir.join("catalog.json");
    fs::write(&catalog, "[]").expect("write empty catalog");

    let mut cmd = Command::cargo_bin("lernpfad").expect("binary exists");
    cmd.args([
        "recommend",
        "--catalog",
        catalog.to_str().expect("utf-8 path"),
        "--student",
        fixture("student.sample.json").to_str().expect("utf-8 path"),
        "--state-file",
        dir.join("state.json").to_str().expect("utf-8 path"),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No eligible content"));

    let _ = fs::remove_dir_all(&dir);
}
