use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use crate::config::load_config_from_file;


#[test]
fn cli_match() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("a(b+)(x)?")
        .arg("xabbc")
        .assert()
        .success()
        .stdout("1..4 \"abb\"\n  1: 2..4 \"bb\"\n  2: -\n");
}

#[test]
fn cli_match_stdin() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("-i")
        .arg("B+")
        .write_stdin("abbc")
        .assert()
        .success()
        .stdout("1..3 \"bb\"\n");
}

#[test]
fn cli_match_all() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("--all")
        .arg("[0-9]+")
        .arg("a1b22")
        .assert()
        .success()
        .stdout("1..2 \"1\"\n3..5 \"22\"\n");
}

#[test]
fn cli_match_whole() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("--whole")
        .arg("a|ab")
        .arg("ab")
        .assert()
        .success()
        .stdout("0..2 \"ab\"\n");

    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("--whole")
        .arg("a")
        .arg("ab")
        .assert()
        .success()
        .stdout("no match\n");
}

#[test]
fn cli_replace() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("replace")
        .arg("(\\w+)@(\\w+)")
        .arg("$2 at $1")
        .arg("joe@example")
        .assert()
        .success()
        .stdout("example at joe\n");
}

#[test]
fn cli_replace_invalid_template() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("replace")
        .arg("a")
        .arg("$x")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid replacement string"));
}

#[test]
fn cli_split_and_tokenize() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("split")
        .arg(",")
        .arg("a,,b")
        .assert()
        .success()
        .stdout("\"a\"\n\"\"\n\"b\"\n");

    Command::cargo_bin("rem")
        .unwrap()
        .arg("tokenize")
        .arg("x*")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("matches the empty string"));
}

#[test]
fn cli_analyze() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("analyze")
        .arg("(b)")
        .arg("abc")
        .assert()
        .success()
        .stdout(
            "nonmatch 0..1 \"a\"\nmatch    1..2 \"b\"\n  group 1: 1..2 \"b\"\n\
             nonmatch 2..3 \"c\"\n",
        );
}

#[test]
fn cli_syntax_error() {
    Command::cargo_bin("rem")
        .unwrap()
        .arg("match")
        .arg("a(")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("can not compile `a(`"));
}

#[test]
fn cli_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file
        .write_str(
            "[flags]\ncase_insensitive = true\n\n\
             [analyze]\nshow_groups = false\n",
        )
        .unwrap();

    Command::cargo_bin("rem")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("analyze")
        .arg("(B)")
        .arg("ab")
        .assert()
        .success()
        .stdout("nonmatch 0..1 \"a\"\nmatch    1..2 \"b\"\n");

    config_file.write_str("[flags]\nunknown = true\n").unwrap();

    Command::cargo_bin("rem")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("match")
        .arg("a")
        .arg("a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn config_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("[flags]\nmultiline = true\n").unwrap();

    let config = load_config_from_file(config_file.path()).unwrap();

    assert_eq!(config.flags.multiline, true);
    assert_eq!(config.flags.case_insensitive, false);
    assert_eq!(config.flags.literal, false);
    assert_eq!(config.analyze.show_groups, true);

    config_file.write_str("").unwrap();

    let config = load_config_from_file(config_file.path()).unwrap();

    assert_eq!(config.flags.multiline, false);
    assert_eq!(config.analyze.show_groups, true);
}
