use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "tunnel-hive"])
        .status()
        .expect("failed to invoke cargo check for tunnel-hive CLI binary");

    assert!(status.success(), "cargo check --bin tunnel-hive should succeed");
}

#[test]
fn cli_runs_a_short_headless_session() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "tunnel-hive",
            "--",
            "--difficulty",
            "easy",
            "--seed",
            "9",
            "--ticks",
            "20",
        ])
        .output()
        .expect("failed to invoke cargo run for tunnel-hive CLI binary");

    assert!(output.status.success(), "tunnel-hive should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("score"), "missing summary in {stdout}");
}
