//! CLI smoke tests — verify basic binary behavior.

use std::process::Command;

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_deskbot"))
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "Expected usage info in --help output");
    assert!(stdout.contains("--interact-every"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deskbot"), "Expected binary name in --version output");
}

#[test]
fn test_short_run_prints_snapshot() {
    // Nonexistent config falls back to defaults
    let output = cli_bin()
        .args([
            "--config",
            "/tmp/nonexistent_deskbot_config_12345.toml",
            "--seed",
            "7",
            "--ticks",
            "5",
            "--tick-ms",
            "10",
            "--interact-every",
            "2",
        ])
        .output()
        .expect("failed to run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).expect("snapshot JSON");
    assert_eq!(snapshot["interaction_count"], 2);
    assert!(snapshot["state"].is_string());
}

#[test]
fn test_invalid_tick_rejected() {
    let output = cli_bin()
        .args(["--config", "/tmp/nonexistent_deskbot_config_12345.toml"])
        .args(["--ticks", "1", "--tick-ms", "0"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
}

#[test]
fn test_print_changes_emits_one_line_per_change() {
    let output = cli_bin()
        .args(["--config", "/tmp/nonexistent_deskbot_config_12345.toml"])
        .args(["--seed", "3", "--ticks", "5", "--tick-ms", "10"])
        .args(["--interact-every", "2", "--print-changes"])
        .output()
        .expect("failed to run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (first, rest) = stdout.split_once('\n').expect("change line before snapshot");
    let change: serde_json::Value = serde_json::from_str(first).expect("change JSON line");
    assert_eq!(change["from"], "idle");
    assert_eq!(change["to"], "excited");
    assert_eq!(change["cause"], "interaction");

    // Second interaction finds the bot already excited: no second line
    let snapshot: serde_json::Value = serde_json::from_str(rest).expect("snapshot JSON");
    assert_eq!(snapshot["interaction_count"], 2);
}
