use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "winterwar-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_strategies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_winterwar-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-strategies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available strategies"));
    assert!(content.contains("merchant"));
}

#[test]
fn cli_json_report_is_parseable() {
    let exe = env!("CARGO_BIN_EXE_winterwar-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--strategies",
            "aggressive,cautious",
            "--seeds",
            "7",
            "--iterations",
            "1",
            "--max-steps",
            "60",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = report.as_array().expect("array of results");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["passed"] == serde_json::json!(true)));
}

#[test]
fn cli_rejects_unknown_strategy() {
    let exe = env!("CARGO_BIN_EXE_winterwar-tester");
    let output = Command::new(exe)
        .args(["--strategies", "berserker"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown strategy"));
}
