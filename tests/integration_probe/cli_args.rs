//! Integration: the envcaps binary rejects malformed arguments before doing any work.

use std::process::Command;

fn envcaps() -> Command {
    Command::new(env!("CARGO_BIN_EXE_envcaps"))
}

#[test]
fn plan_with_explicit_limit_prints_ranges() {
    let out = envcaps()
        .args(["plan", "7", "3", "--limit", "10"])
        .output()
        .expect("run envcaps");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let ranges: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(ranges, ["0..3", "3..6", "6..7"]);
}

#[test]
fn plan_rejects_trailing_arguments() {
    let out = envcaps()
        .args(["plan", "7", "3", "--limit", "10", "--json"])
        .output()
        .expect("run envcaps");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("E-ENVCAPS-0642"));
}

#[test]
fn emulated_limit_below_floor_is_rejected() {
    let out = envcaps()
        .args(["probe", "--emulate-limit", "0"])
        .output()
        .expect("run envcaps");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("E-ENVCAPS-0200"));
}
