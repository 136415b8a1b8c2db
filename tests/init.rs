use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_fundmatch"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "fundmatch init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".fundmatch.toml");
    assert!(config_path.exists(), ".fundmatch.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[data]"));
    assert!(content.contains("[embedding]"));
    assert!(content.contains("[competencies]"));

    // Everything is commented out, so parsing yields the defaults.
    let config = fundmatch_core::FundmatchConfig::from_toml(&content).unwrap();
    assert_eq!(config.screening.default_results, 10);
    assert_eq!(config.embedding.provider, "local");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".fundmatch.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_fundmatch"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".fundmatch.toml")).unwrap(),
        "# existing"
    );
}
