//! End-to-end tests for the moneynote binary
//!
//! Every test runs against its own data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn moneynote(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("moneynote").unwrap();
    cmd.env("MONEYNOTE_DATA_DIR", dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_creates_default_categories() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    moneynote(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    moneynote(&dir)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Food"))
        .stdout(predicate::str::contains("Salary"))
        .stdout(predicate::str::contains("Other"));
}

#[test]
fn expense_add_then_list_by_month() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args([
            "expense",
            "add",
            "12.50",
            "--category",
            "Food",
            "--sub",
            "Coffee",
            "--description",
            "Flat white",
            "--date",
            "2025-01-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("$12.50 in Food"));

    moneynote(&dir)
        .args(["expense", "list", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flat white"))
        .stdout(predicate::str::contains("Coffee"));

    moneynote(&dir)
        .args(["expense", "list", "--month", "2025-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));
}

#[test]
fn expense_without_category_lands_in_other() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args(["expense", "add", "3", "--date", "2025-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("in Other"));
}

#[test]
fn invalid_amount_is_rejected() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args(["expense", "add", "abc", "--date", "2025-03-01"])
        .assert()
        .failure();

    moneynote(&dir)
        .args(["expense", "add", "-5", "--date", "2025-03-01"])
        .assert()
        .failure();

    moneynote(&dir)
        .args(["expense", "add", "10.999", "--date", "2025-03-01"])
        .assert()
        .failure();

    moneynote(&dir)
        .args(["expense", "add", "90000000000000000", "--date", "2025-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn budget_set_category_and_show_progress() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args(["budget", "set-category", "Food", "400", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budgeted $400.00 for Food in January 2025"));

    moneynote(&dir)
        .args([
            "expense",
            "add",
            "100",
            "--category",
            "Food",
            "--date",
            "2025-01-10",
        ])
        .assert()
        .success();

    moneynote(&dir)
        .args(["budget", "show", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget: January 2025"))
        .stdout(predicate::str::contains("Food"))
        .stdout(predicate::str::contains("$100.00"));

    moneynote(&dir)
        .args(["budget", "show", "--month", "2025-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No budget for February 2025."));
}

#[test]
fn budget_limit_on_income_category_fails() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args(["budget", "set-category", "Salary", "400", "--month", "2025-01"])
        .assert()
        .failure();
}

#[test]
fn recurring_process_generates_once() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args([
            "recurring",
            "add",
            "15",
            "--category",
            "Entertainment",
            "--description",
            "Streaming",
            "--start",
            "2025-01-05",
            "--end",
            "2025-02-05",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created recurring expense"))
        .stdout(predicate::str::contains("Next: 2025-01-05"));

    // Both occurrences are in the past; the end date stops the rule after them
    moneynote(&dir)
        .args(["recurring", "process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2 record(s)"));

    moneynote(&dir)
        .args(["recurring", "process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recurring transactions were due."));

    moneynote(&dir)
        .args(["expense", "list", "--month", "2025-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Streaming"));
}

#[test]
fn export_json_then_import_into_fresh_directory() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let export_file = source.path().join("export.json");

    moneynote(&source)
        .args([
            "expense",
            "add",
            "42",
            "--category",
            "Shopping",
            "--description",
            "Headphones",
            "--date",
            "2025-04-02",
        ])
        .assert()
        .success();

    moneynote(&source)
        .args(["export", "json", "--pretty", "--output"])
        .arg(&export_file)
        .assert()
        .success();
    assert!(export_file.is_file());

    moneynote(&target)
        .args(["import", "json"])
        .arg(&export_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Import complete (merge)."));

    moneynote(&target)
        .args(["expense", "list", "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Headphones"));
}

#[test]
fn replace_import_requires_force() {
    let dir = TempDir::new().unwrap();
    let export_file = dir.path().join("export.json");

    moneynote(&dir)
        .args(["export", "json", "--output"])
        .arg(&export_file)
        .assert()
        .success();

    moneynote(&dir)
        .args(["import", "json", "--mode", "replace"])
        .arg(&export_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("run again with --force"));
}

#[test]
fn settings_set_persists() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args(["settings", "set", "currency_symbol", "€"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set currency_symbol = €"));

    moneynote(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("€"));

    moneynote(&dir)
        .args(["settings", "set", "budget_alert_threshold", "250"])
        .assert()
        .failure();
}

#[test]
fn audit_records_created_expense() {
    let dir = TempDir::new().unwrap();

    moneynote(&dir)
        .args([
            "expense",
            "add",
            "8",
            "--description",
            "Parking",
            "--date",
            "2025-05-01",
        ])
        .assert()
        .success();

    moneynote(&dir)
        .args(["audit", "--entity", "expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Expense"));
}
