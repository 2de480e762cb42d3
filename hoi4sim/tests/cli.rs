// The cargo_bin! macro requires build script setup that's overkill for simple tests.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

const STATES_CSV: &str = "\
country,infrastructure,building_slots,military_factories,dockyards,civilian_factories
Soviet Union,6,12,4,0,8
Soviet Union,4,10,2,1,5
Soviet Union,2,8,0,0,1
Finland,3,6,1,0,2
0
";

fn states_csv() -> (TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("states.csv");
    fs::write(&path, STATES_CSV).unwrap();
    (dir, path)
}

#[test]
fn test_help_flag() {
    let output = std::process::Command::new(cargo_bin("hoi4sim"))
        .arg("--help")
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("sweep"));
    assert!(stdout.contains("run"));
}

#[test]
fn test_game_path_respected() {
    // Must fail on the given path, not fall back to a detected install
    Command::new(cargo_bin("hoi4sim"))
        .args(["sweep", "--country", "SOV", "--game-path", "/nonexistent/path"])
        .args(["--duration", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_unknown_country_fails() {
    let (_dir, csv) = states_csv();
    Command::new(cargo_bin("hoi4sim"))
        .args(["run", "--country", "Narnia", "--switch-day", "3", "--csv"])
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Narnia"));
}

#[test]
fn test_sweep_writes_one_row_per_switch_day() {
    let (dir, csv) = states_csv();
    let out = dir.path().join("sweep.csv");

    Command::new(cargo_bin("hoi4sim"))
        .args(["sweep", "--country", "Soviet Union", "--duration", "30", "--csv"])
        .arg(&csv)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "switch_day,switch_date,switch_year,military_production,civilian_factories,military_factories"
    );
    assert_eq!(lines.len(), 31);
    assert!(lines[1].starts_with("0,1936.1.1,"));
    assert!(lines[30].starts_with("29,1936.1.30,"));
}

#[test]
fn test_sequential_and_threaded_sweeps_agree() {
    let (dir, csv) = states_csv();
    let run = |name: &str, extra: &[&str]| {
        let out = dir.path().join(name);
        Command::new(cargo_bin("hoi4sim"))
            .args(["sweep", "--country", "SovietUnion", "--duration", "40", "--csv"])
            .arg(&csv)
            .args(extra)
            .arg("--output")
            .arg(&out)
            .assert()
            .success();
        fs::read_to_string(out).unwrap()
    };
    let sequential = run("seq.csv", &["--sequential"]);
    let threaded = run("par.csv", &["--threads", "2"]);
    assert_eq!(sequential, threaded);
}

#[test]
fn test_run_prints_daily_series() {
    let (_dir, csv) = states_csv();
    Command::new(cargo_bin("hoi4sim"))
        .args(["run", "--country", "Finland", "--switch-day", "0", "--duration", "3"])
        .args(["--start-date", "1939.11.30", "--csv"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "day,date,military_production,civilian_factories,military_factories,economy_level\n",
        ))
        .stdout(predicate::str::contains("2,1939.12.2,"));
}

#[test]
fn test_bad_rules_file_fails() {
    let (dir, csv) = states_csv();
    let rules = dir.path().join("rules.json");
    fs::write(&rules, r#"{ "factory": { "minimum_efficiency": 0.0 } }"#).unwrap();
    Command::new(cargo_bin("hoi4sim"))
        .args(["run", "--country", "Finland", "--switch-day", "0", "--csv"])
        .arg(&csv)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("minimum efficiency"));
}
