//! End-to-end behaviour of generated programs under `go run`.
//!
//! Each test is skipped when no Go toolchain is on PATH, unless
//! `SIMPLEC_REQUIRE_GO` is set, in which case a missing toolchain fails.

use std::fs;
use std::process::{Command, Output};

use simplec::{compile, Options};

fn go_available() -> bool {
    Command::new("go")
        .arg("version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn run(source: &str) -> Option<Output> {
    if !go_available() {
        if std::env::var_os("SIMPLEC_REQUIRE_GO").is_some() {
            panic!("SIMPLEC_REQUIRE_GO is set but no go toolchain is on PATH");
        }
        eprintln!("skipping: go toolchain not found (set SIMPLEC_REQUIRE_GO to fail instead)");
        return None;
    }
    let go = compile(source, &Options::default()).expect("translation failed");
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("prog.go");
    fs::write(&file, go).unwrap();
    let output = Command::new("go")
        .arg("run")
        .arg(&file)
        .current_dir(dir.path())
        .output()
        .expect("failed to spawn go");
    Some(output)
}

fn stdout_of(source: &str) -> Option<String> {
    run(source).map(|out| {
        assert!(
            out.status.success(),
            "program failed:\n{}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).into_owned()
    })
}

#[test]
fn test_increment_and_print() {
    if let Some(out) = stdout_of("set x to 5\ninc x\nsay x\n") {
        assert_eq!(out, "6\n");
    }
}

#[test]
fn test_list_push_and_index() {
    let source = "list nums is 1,2,3\npush 4 to nums\nget first from nums at 0\nsay first\nset n to 0\neach item in nums\ninc n\nend\nsay n\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "1\n4\n");
    }
}

#[test]
fn test_if_else_branches() {
    let program = |x: i32| format!("set x to {}\nif x is 5\nsay \"five\"\nelse\nsay \"not five\"\nend\n", x);
    if let Some(out) = stdout_of(&program(5)) {
        assert_eq!(out, "five\n");
    }
    if let Some(out) = stdout_of(&program(3)) {
        assert_eq!(out, "not five\n");
    }
}

#[test]
fn test_repeat_runs_exactly() {
    if let Some(out) = stdout_of("repeat 3\nsay \"hi\"\nend\n") {
        assert_eq!(out, "hi\nhi\nhi\n");
    }
}

#[test]
fn test_random_stays_in_range() {
    if let Some(out) = stdout_of("repeat 50\nrandom r between 1 5\nsay r\nend\n") {
        let values: Vec<i32> = out.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| (1..5).contains(v)), "{:?}", values);
    }
}

#[test]
fn test_fetch_failure_is_empty_text() {
    if let Some(out) = stdout_of("fetch \"http://127.0.0.1:1/\" into page\nsay \"[\" + page + \"]\"\n") {
        assert_eq!(out, "[]\n");
    }
}

#[test]
fn test_parameter_shadows_global() {
    let source = "set x to 1\ndefine show with x\nsay x\nend\nrun show with 9\nsay x\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "9\n1\n");
    }
}

#[test]
fn test_binding_inside_block_survives() {
    if let Some(out) = stdout_of("set x to 1\nif x is 1\nset y to 2\nend\nsay y\n") {
        assert_eq!(out, "2\n");
    }
}

#[test]
fn test_missing_arguments_are_nil() {
    if let Some(out) = stdout_of("define f with a b\nsay a b\nend\nrun f with 1\n") {
        assert_eq!(out, "1 <nil>\n");
    }
}

#[test]
fn test_recursion_and_function_state() {
    let source = "set calls to 0\ndefine down with n\ninc calls\nif n > 0\nset next to n - 1\nrun down with next\nend\nend\nrun down with 3\nsay calls\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "4\n");
    }
}

#[test]
fn test_each_over_number_is_type_fault() {
    if let Some(out) = run("set x to 5\neach i in x\nsay i\nend\n") {
        assert!(!out.status.success());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("type fault: each expects a list, got number"), "{}", stderr);
    }
}

#[test]
fn test_maps_and_contains() {
    let source = "map ages\nput 36 in ages at \"ada\"\nkey age from ages at \"ada\"\nsay age\nset s to \"hello world\"\nif s contains \"world\"\nsay \"yes\"\nend\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "36\nyes\n");
    }
}

#[test]
fn test_text_coerces_to_number_or_zero() {
    let source = "set t to \"abc\" + 1\nsay t\nset u to \"41\" + 1\nsay u\nset v to \" 5\" + 0\nsay v\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "1\n42\n0\n");
    }
}

#[test]
fn test_other_kinds_coerce_to_zero() {
    let source = "set b to true\nset n to b + 0\nsay n\nlist xs is 1,2\nset l to xs + 0\nsay l\nmap m\nset k to m + 0\nsay k\nkey missing from m at \"x\"\nset z to missing + 0\nsay z\n";
    if let Some(out) = stdout_of(source) {
        assert_eq!(out, "0\n0\n0\n0\n");
    }
}

#[test]
fn test_floats_truncate_toward_zero() {
    if let Some(out) = stdout_of("set a to 2.9 + 0\nsay a\nset b to -2.9 + 0\nsay b\nset flag to true\nrepeat flag\nsay \"never\"\nend\n") {
        assert_eq!(out, "2\n-2\n");
    }
}
