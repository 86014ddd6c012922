//! Golden-output end-to-end tests against the built `interp` binary,
//! one per scenario in the core specification's testable-properties
//! section.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn source_file(src: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(src.as_bytes()).expect("write source");
    f
}

fn run_source(src: &str) -> assert_cmd::assert::Assert {
    let file = source_file(src);
    Command::cargo_bin("interp")
        .unwrap()
        .arg("-I")
        .arg(file.path())
        .assert()
}

#[test]
fn iterative_fibonacci() {
    let src = "N = 10\n\
method fib(n)\n\
\ta = 0\n\
\tb = 1\n\
\tloop for i from 0 to n-1\n\
\t\ttmp = b\n\
\t\tb = a+b\n\
\t\ta = tmp\n\
\treturn a\n\
output(fib(N))\n";
    run_source(src).success().stdout(predicate::str::contains("55"));
}

#[test]
fn recursive_factorial() {
    let src = "method factorial(x)\n\
\tif x == 1 then\n\
\t\treturn 1\n\
\treturn x*factorial(x-1)\n\
output(factorial(5))\n";
    run_source(src).success().stdout(predicate::str::contains("120"));
}

#[test]
fn array_of_fibonacci() {
    let src = "N = 6\n\
method fib(n)\n\
\tarr = Array(n+1)\n\
\tarr[0] = 0\n\
\tarr[1] = 1\n\
\tloop for i from 2 to n\n\
\t\tarr[i] = arr[i-1] + arr[i-2]\n\
\treturn arr[n]\n\
output(fib(N))\n";
    run_source(src).success().stdout(predicate::str::contains("8"));
}

#[test]
fn stack_round_trip() {
    let src = "s = Stack()\n\
s.push(1)\n\
s.push(2)\n\
output(s.pop())\n\
output(s.pop())\n\
output(s.isEmpty())\n";
    let assert = run_source(src).success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = out.lines().take(3).collect();
    assert_eq!(lines, vec!["2", "1", "true"]);
}

#[test]
fn string_plus_numeric_coercion() {
    let src = "x = 5\noutput(\"val=\" + x)\n";
    run_source(src).success().stdout(predicate::str::contains("val=5"));
}

#[test]
fn closure_capture_survives_defining_function_returning() {
    let src = "method make()\n\
\tk = 7\n\
\tmethod inner()\n\
\t\treturn k\n\
\treturn inner\n\
f = make()\n\
output(f())\n";
    run_source(src).success().stdout(predicate::str::contains("7"));
}

#[test]
fn successful_run_prints_timing_footer() {
    let src = "output(1)\n";
    run_source(src)
        .success()
        .stdout(predicate::str::contains("Successful execution."))
        .stdout(predicate::str::contains("Time elapsed:"));
}

#[test]
fn interpreter_error_exits_zero_and_reports_on_stderr() {
    let src = "output(undefined_name)\n";
    run_source(src)
        .success()
        .stderr(predicate::str::contains("NameError"));
}

#[test]
fn unknown_flag_fails_the_process() {
    Command::cargo_bin("interp").unwrap().arg("-z").assert().failure();
}

#[test]
fn missing_input_file_fails_the_process() {
    Command::cargo_bin("interp")
        .unwrap()
        .arg("-I")
        .arg("/nonexistent/path/to/nowhere.pc")
        .assert()
        .failure();
}

#[test]
fn help_flag_succeeds_without_a_source_file() {
    Command::cargo_bin("interp")
        .unwrap()
        .arg("-?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
