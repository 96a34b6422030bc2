use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const ONE_MOVE: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "0", "13", "14", "15", "12"];
const UNSOLVABLE: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "15", "14", "0"];

fn solver() -> Command {
    Command::cargo_bin("fifteen_solver").expect("binary exists")
}

fn build_db(path: &Path) {
    solver()
        .args(["build-db", "--output"])
        .arg(path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 24964 profiles"));
}

#[test]
fn solves_a_board_with_a_freshly_built_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("matrix_states.json");
    build_db(&db);

    solver()
        .arg("solve")
        .args(ONE_MOVE)
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("The puzzle is solvable."))
        .stdout(predicate::str::contains("Moves: 1"))
        .stdout(predicate::str::contains("Sequence: Down"))
        .stdout(predicate::str::contains("Generated states: 2"));

    solver()
        .args(["solve", "--strategy", "rbfs", "--db"])
        .arg(&db)
        .write_stdin("1 2 3 4 5 6 7 8 9 10 11 0 13 14 15 12\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moves: 1"))
        .stdout(predicate::str::contains("Generated states: 3"));
}

#[test]
fn rejects_a_short_board() {
    solver()
        .args(["solve", "1", "2", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 16 tiles, got 3"));
}

#[test]
fn reports_unsolvable_boards_without_a_table() {
    let dir = tempfile::tempdir().unwrap();

    solver()
        .arg("solve")
        .args(UNSOLVABLE)
        .arg("--db")
        .arg(dir.path().join("absent.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("not solvable"));
}

#[test]
fn missing_table_aborts_unless_fallback_is_requested() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.json");

    solver()
        .arg("solve")
        .args(ONE_MOVE)
        .arg("--db")
        .arg(&absent)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern database unavailable"));

    solver()
        .arg("solve")
        .args(ONE_MOVE)
        .arg("--db")
        .arg(&absent)
        .arg("--fallback")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moves: 1"));
}

#[test]
fn batch_writes_one_answer_per_board() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("puzzles.txt");
    let output = dir.path().join("answers.txt");
    fs::write(
        &input,
        "# sample\n1 2 3 4 5 6 7 8 9 10 11 0 13 14 15 12\n1 2 3 4 5 6 7 8 9 10 11 12 13 15 14 0\n1 2 3\n",
    )
    .unwrap();

    solver()
        .args(["batch", "--heuristic", "manhattan-linear", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let answers = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = answers.lines().collect();
    assert!(lines[0].starts_with("# 3 puzzles"));
    assert_eq!(lines[1], "D");
    assert_eq!(lines[2], "unsolvable");
    assert!(lines[3].starts_with("error: expected 16 tiles"));
}

#[test]
fn verify_reports_no_overestimates_for_manhattan() {
    solver()
        .args(["verify", "--depth", "6", "--heuristic", "manhattan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 over-estimates"));
}
