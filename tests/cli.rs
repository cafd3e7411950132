use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn ze() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ze"))
}

fn script(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", source).unwrap();
    file
}

#[test]
fn runs_file_successfully() {
    let file = script("var greeting = \"hello\";\nprint greeting + \" world\";\n");

    ze().arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn static_error_exits_64_without_running() {
    let file = script("print \"before\";\nprint ;\n");

    ze().arg("run")
        .arg(file.path())
        .assert()
        .code(64)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "[line 2] Error at ';': Expect expression.",
        ));
}

#[test]
fn resolver_error_exits_64() {
    let file = script("{ var unused = 1; }\n");

    ze().arg("run")
        .arg(file.path())
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Local variable is not used."));
}

#[test]
fn runtime_error_exits_70() {
    let file = script("print 1;\nprint 10 / 0;\n");

    ze().arg("run")
        .arg(file.path())
        .assert()
        .code(70)
        .stdout("1\n")
        .stderr(predicate::str::contains("Divide by zero.\n[line 2]"));
}

#[test]
fn missing_file_exits_74() {
    ze().args(["run", "no_such_file.ze"])
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn non_utf8_file_exits_74() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[b'p', 0xff, 0xfe, b';']).unwrap();

    ze().arg("run")
        .arg(file.path())
        .assert()
        .code(74)
        .stderr(predicate::str::contains("invalid utf-8"));
}

#[test]
fn tokenize_prints_tokens() {
    let file = script("var x = 1;");

    ze().arg("tokenize")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            "VAR var null\nIDENTIFIER x null\nEQUAL = null\nNUMBER 1 1.0\nSEMICOLON ; null\nEOF  null\n",
        );
}

#[test]
fn tokenize_reports_lexical_errors() {
    let file = script("@ 1");

    ze().arg("tokenize")
        .arg(file.path())
        .assert()
        .code(64)
        .stdout(predicate::str::contains("NUMBER 1 1.0"))
        .stderr(predicate::str::contains("[line 1] Error: Unexpected character."));
}

#[test]
fn tokenize_json_lines() {
    let file = script("x");

    ze().args(["tokenize", "--json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lexeme\":\"x\""))
        .stdout(predicate::str::contains("\"line\":1"));
}

#[test]
fn parse_prints_syntax_tree() {
    let file = script("print 1 + 2 * 3;");

    ze().arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout("(print (+ 1 (* 2 3)))\n");
}

#[test]
fn repl_exits_on_eof() {
    ze().arg("run").write_stdin("").assert().success();
}

#[test]
fn repl_keeps_state_and_recovers_after_errors() {
    ze().arg("run")
        .write_stdin("var a = 1;\nprint nope;\nprint ;\na = a + 1;\nprint a;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"))
        .stderr(predicate::str::contains("Undefined variable 'nope'."))
        .stderr(predicate::str::contains("Expect expression."));
}

#[test]
fn log_flag_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let file = script("print 1;");

    ze().current_dir(dir.path())
        .args(["--log", "run"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n");

    assert!(dir.path().join("ze.log").exists());
}
