use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PEOPLE: &str = "\
name,city,notes
Ada Lovelace,London,\"analyst, poet\"
Alan Turing,Wilmslow,codebreaker
Grace Hopper,New York,compiler pioneer
Renée Ménard,Montréal,crème brûlée fan
";

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("people.csv");
    fs::write(&table, PEOPLE).unwrap();
    (dir, table)
}

fn gridfind(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gridfind").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn json_results(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_text_search() {
    let (dir, table) = setup();
    gridfind(dir.path())
        .arg(&table)
        .arg("lovelace")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 match(es) in 1 cell(s):"))
        .stdout(predicate::str::contains("name"));
}

#[test]
fn test_no_matches() {
    let (dir, table) = setup();
    gridfind(dir.path())
        .arg(&table)
        .arg("zebra")
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found"));
}

#[test]
fn test_json_output_with_diacritics() {
    let (dir, table) = setup();
    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "creme brulee", "--all-terms"])
        .args(["--ignore-diacritics", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = json_results(&out.stdout);
    assert_eq!(v["rows_searched"], 4);
    assert_eq!(v["total_results"], 1);
    let hit = &v["results"][0];
    assert_eq!(hit["column"], "notes");
    assert_eq!(hit["key"], 5);
    assert_eq!(hit["matches"][0]["start"], 0);
    assert_eq!(hit["matches"][0]["len"], 6);
}

#[test]
fn test_explicit_columns() {
    let (dir, table) = setup();
    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "on", "--columns", "city"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = json_results(&out.stdout);
    let cities: Vec<_> = v["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(cities, vec!["London", "Montréal"]);
}

#[test]
fn test_visible_scope_skips_hidden_columns() {
    let (dir, table) = setup();
    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "o", "--mode", "starts-with"])
        .args(["--scope", "visible", "--hidden", "notes", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = json_results(&out.stdout);
    assert!(v["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["column"] != "notes"));
}

#[test]
fn test_regex_mode() {
    let (dir, table) = setup();
    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), r"^[A-G]\w+ [HT]", "--mode", "regex"])
        .args(["--case-sensitive", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = json_results(&out.stdout);
    assert_eq!(v["total_results"], 2);
    assert_eq!(v["results"][0]["row"], 1);
    assert_eq!(v["results"][1]["row"], 2);
}

#[test]
fn test_config_defaults_apply() {
    let (dir, table) = setup();
    let config = dir.path().join("gridfind.toml");
    fs::write(&config, "[defaults]\nmode = \"equals\"\n").unwrap();

    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "london", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(json_results(&out.stdout)["total_results"], 1);

    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "lond", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(json_results(&out.stdout)["total_results"], 0);
}

#[test]
fn test_metrics_on_stderr() {
    let (dir, table) = setup();
    gridfind(dir.path())
        .args([table.to_str().unwrap(), "a", "--metrics"])
        .assert()
        .success()
        .stderr(predicate::str::contains("full_scans 1"));
}

#[test]
fn test_tab_delimited_file() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("items.tsv");
    fs::write(&table, "sku\ttitle\n1\tred kettle\n2\tblue lamp\n").unwrap();

    let out = gridfind(dir.path())
        .args([table.to_str().unwrap(), "lamp", "--delimiter", "tab"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v = json_results(&out.stdout);
    assert_eq!(v["results"][0]["column"], "title");
    assert_eq!(v["results"][0]["row"], 1);
}

#[test]
fn test_errors() {
    let (dir, table) = setup();
    gridfind(dir.path())
        .arg(dir.path().join("missing.csv"))
        .arg("x")
        .assert()
        .failure();

    gridfind(dir.path())
        .args([table.to_str().unwrap(), "x", "--scope", "explicit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--columns"));

    gridfind(dir.path())
        .args([table.to_str().unwrap(), "x", "--delimiter", ";;"])
        .assert()
        .failure();
}
