use std::process::Command;

#[test]
fn cli_mode_with_config_and_dry_run_prints_frames() {
    let binary_path = env!("CARGO_BIN_EXE_ib-ws-smoke");
    let config_path = format!("{}/config/smoke.yaml", env!("CARGO_MANIFEST_DIR"));

    let output = Command::new(binary_path)
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start ib-ws-smoke binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let frames: Vec<&str> = stdout.lines().collect();
    assert_eq!(frames.len(), 6);
    assert_eq!(
        frames[0],
        r#"{"code":"PLACE-ORDER","account":"DU997901","op":"BUY","symbol":"CSCO","qty":1,"order_type":"LMT","price":123.32}"#
    );
    assert_eq!(
        frames[1],
        r#"{"code":"PLACE-ORDER","account":"DU1031917","op":"SELL","symbol":"TEVA","qty":2,"order_type":"MKT"}"#
    );
    assert_eq!(frames[5], r#"{"code":"ACCOUNT-INFO-REQUEST","account":"DU997900"}"#);
}

#[test]
fn cli_mode_rejects_missing_config() {
    let binary_path = env!("CARGO_BIN_EXE_ib-ws-smoke");

    let output = Command::new(binary_path)
        .arg("--config")
        .arg("/nonexistent/smoke.yaml")
        .arg("--dry-run")
        .output()
        .expect("Failed to start ib-ws-smoke binary");

    assert!(!output.status.success());
}
