//! End-to-end tests driving the built `lox` binary, exercising the CLI
//! surface (`spec.md` §6.4) and the exit codes it must produce (`spec.md`
//! §6.3). Unlike `tests/*.rs`'s library-level macros, these go through a
//! real child process and scratch `.lox` files, mirroring the teacher's
//! own `assert_cmd`-driven error-case tests.

use std::io::Write;
use std::str;

use assert_cmd::Command;
use tempfile::{Builder, NamedTempFile};

fn script(source: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".lox").tempfile().expect("create scratch script");
    file.write_all(source.as_bytes()).expect("write scratch script");
    file
}

#[test]
fn clean_run_exits_zero() {
    let file = script(r#"print "one"; print true; print 2 + 1;"#);

    Command::cargo_bin("lox")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("one\ntrue\n3\n");
}

#[test]
fn bare_script_argument_is_shorthand_for_run() {
    let file = script("print 1 + 2;");

    Command::cargo_bin("lox").unwrap().arg(file.path()).assert().success().stdout("3\n");
}

#[test]
fn parse_error_exits_65_and_reports_on_stderr() {
    let file = script("1 + 2");

    Command::cargo_bin("lox")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(65)
        .stderr("[line 1] Error at end: Expect ';' after expression\n");
}

#[test]
fn resolve_error_exits_65() {
    let file = script("class A { init() { return 1; } }");

    Command::cargo_bin("lox").unwrap().arg("run").arg(file.path()).assert().code(65);
}

#[test]
fn runtime_error_exits_70_and_reports_line() {
    let file = script("print missing;");

    Command::cargo_bin("lox")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(70)
        .stderr("Undefined variable 'missing'\n[line 1]\n");
}

#[test]
fn debug_lex_dumps_one_token_per_line() {
    let file = script("var a;");

    let output = Command::cargo_bin("lox")
        .unwrap()
        .args(["debug", "lex"])
        .arg(file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = str::from_utf8(&output).unwrap();

    assert!(text.contains("Var var"), "missing 'var' token in: {text}");
    assert!(text.contains("Identifier a"), "missing 'a' token in: {text}");
    assert!(text.contains("Semicolon ;"), "missing ';' token in: {text}");
    assert!(text.lines().last().unwrap_or("").starts_with("Eof"), "missing trailing EOF token in: {text}");
}

#[test]
fn debug_parse_dumps_parenthesized_ast() {
    let file = script("print 1 + 2;");

    Command::cargo_bin("lox")
        .unwrap()
        .args(["debug", "parse"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("(print (+ 1 2))\n");
}

#[test]
fn unreadable_script_path_exits_with_usage_error() {
    let assert = Command::cargo_bin("lox").unwrap().arg("run").arg("/no/such/file.lox").assert().code(64);
    let stderr = str::from_utf8(&assert.get_output().stderr).unwrap().to_string();
    assert!(stderr.contains("Could not read"), "unexpected stderr: {stderr}");
}
