// Integration tests enforcing the eval --json stdout contract and the
// exit-code registry for the eval command.
//
// Run with: cargo test -p nebula-cli --test json_contract_tests

use std::process::Command;

fn nebulacalc() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nebulacalc"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(stdout: &str) -> serde_json::Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");

    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!(
            "stdout must be valid JSON.\nParse error: {}\nstdout:\n{}",
            e, trimmed
        )
    })
}

#[test]
fn eval_plain_prints_result_only() {
    let output = nebulacalc()
        .args(["eval", "2+2"])
        .output()
        .expect("nebulacalc eval");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "4");
}

#[test]
fn eval_accepts_display_symbols() {
    let output = nebulacalc()
        .args(["eval", "2×3÷4"])
        .output()
        .expect("nebulacalc eval");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1.5");
}

#[test]
fn eval_json_has_stable_shape() {
    let output = nebulacalc()
        .args(["eval", "2^10", "--json"])
        .output()
        .expect("nebulacalc eval --json");

    assert!(output.status.success());
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));

    assert_eq!(val["expression"], "2^10");
    assert_eq!(val["result"], "1024");
    assert_eq!(val["ok"], true);
}

#[test]
fn eval_error_sentinel_exits_one() {
    let output = nebulacalc()
        .args(["eval", "2+"])
        .output()
        .expect("nebulacalc eval");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Error");
}

#[test]
fn eval_error_json_still_single_value() {
    let output = nebulacalc()
        .args(["eval", "1/0", "--json"])
        .output()
        .expect("nebulacalc eval --json");

    assert_eq!(output.status.code(), Some(1));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["result"], "Error");
    assert_eq!(val["ok"], false);
}

#[test]
fn eval_empty_expression_is_usage_error() {
    let output = nebulacalc()
        .args(["eval", "   "])
        .output()
        .expect("nebulacalc eval");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty expression"));
}
