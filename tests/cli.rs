use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("between"))
        .stdout(predicate::str::contains("scatter"));
}

#[test]
fn between_on_bundled_iris() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["between", "-x", "species", "-y", "sepal_length", "--dataset", "iris"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Between stats comparison"))
        .stdout(predicate::str::contains("Test: One-way ANOVA with 3 groups"))
        .stdout(predicate::str::contains("F(2, 147) = 119.26"));
}

#[test]
fn bar_prints_the_small_expected_warning() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["bar", "-x", "cyl", "-y", "vs", "--dataset", "mtcars"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Chi-square"))
        .stdout(predicate::str::contains("Warning: Some expected frequencies are less than 5"));
}

#[test]
fn scatter_writes_plot_and_json_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("pairs.csv");
    fs::write(&csv, "a,b\n1,2\n2,4\n3,5\n4,4\n5,5\n").unwrap();
    let plot = dir.path().join("fit.svg");
    let json = dir.path().join("fit.json");
    let opts = dir.path().join("opts.json");
    fs::write(&opts, r#"{"marginal": false, "bins": 6}"#).unwrap();

    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.arg("scatter")
        .args(["-x", "a", "-y", "b", "--data"])
        .arg(&csv)
        .arg("--plot")
        .arg(&plot)
        .arg("--json")
        .arg(&json)
        .arg("--options")
        .arg(&opts);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("t_Student(3) = 2.12"))
        .stderr(predicate::str::contains(
            "bins/hist_kws arguments are ignored when marginal=False.",
        ));

    assert!(fs::metadata(&plot).unwrap().len() > 0);
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["n_obs"], 5);
    assert_eq!(value["expression_model"], "ŷ = 2.20 + 0.60x");
}

#[test]
fn unknown_dataset_fails() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["between", "-x", "a", "-y", "b", "--dataset", "titanic"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("dataset_name must be one of: iris, mtcars"));
}

#[test]
fn invalid_approach_is_rejected_by_the_parser() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["bar", "-x", "cyl", "-y", "vs", "--dataset", "mtcars", "--approach", "g-test"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("`approach` must be one of"));
}

#[test]
fn datasets_list_and_export() {
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["datasets", "list"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("iris  rows=150 columns=5"))
        .stdout(predicate::str::contains("mtcars  rows=32 columns=12"));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("iris.csv");
    let mut cmd = Command::cargo_bin("fleur").unwrap();
    cmd.args(["datasets", "export", "iris"]).arg(&out);
    cmd.assert().success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("sepal_length,sepal_width,petal_length,petal_width,species"));
    assert_eq!(text.lines().count(), 151);
}
