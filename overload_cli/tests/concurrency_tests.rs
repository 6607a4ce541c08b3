//! Concurrency tests for the overload binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the body-weight log simultaneously (file locking)
//! - Read the session log while another process writes it
//! - Compact the session log while another process writes it
//! - Race to start a session without ending up with two active ones

use assert_cmd::Command;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("overload"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_body_weight_appends() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("weight")
                    .arg("add")
                    .arg(format!("{}", 80 + i))
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }

    let log = std::fs::read_to_string(data_dir.join("bodyweight.jsonl"))
        .expect("Failed to read body-weight log");

    // Every line is a complete JSON record
    assert_eq!(log.lines().count(), 8);
    for line in log.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("Interleaved write");
    }
}

#[test]
fn test_reads_during_session_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let reader_dir = data_dir.clone();
    let reader = thread::spawn(move || {
        for _ in 0..5 {
            cli()
                .arg("streak")
                .arg("--data-dir")
                .arg(&reader_dir)
                .assert()
                .success();
            thread::sleep(Duration::from_millis(5));
        }
    });

    for reps in 5..10 {
        cli()
            .arg("log")
            .arg("skull_crusher")
            .arg("--weight")
            .arg("30")
            .arg("--reps")
            .arg(reps.to_string())
            .arg("--data-dir")
            .arg(&data_dir)
            .assert()
            .success();
    }

    reader.join().expect("Reader thread panicked");

    cli()
        .arg("finish")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Sets: 5"));
}

#[test]
fn test_compact_during_session_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let compact_dir = data_dir.clone();
    let compactor = thread::spawn(move || {
        for _ in 0..5 {
            cli()
                .arg("compact")
                .arg("--data-dir")
                .arg(&compact_dir)
                .assert()
                .success();
        }
    });

    for reps in 5..10 {
        cli()
            .arg("log")
            .arg("skull_crusher")
            .arg("--weight")
            .arg("30")
            .arg("--reps")
            .arg(reps.to_string())
            .arg("--data-dir")
            .arg(&data_dir)
            .assert()
            .success();
    }

    compactor.join().expect("Compactor thread panicked");

    cli()
        .arg("finish")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Sets: 5"));
}

#[test]
fn test_concurrent_starts_leave_one_active_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("start")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .output()
                    .expect("Failed to run start")
                    .status
                    .success()
            })
        })
        .collect();

    let started = handles
        .into_iter()
        .map(|h| h.join().expect("Starter thread panicked"))
        .filter(|ok| *ok)
        .count();
    assert_eq!(started, 1);

    let log = std::fs::read_to_string(data_dir.join("sessions.jsonl"))
        .expect("Failed to read session log");
    assert_eq!(log.lines().count(), 1);
}
