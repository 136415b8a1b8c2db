//! End-to-end runs of the binary against a small dataset.
//!
//! The config points at an OpenAI-compatible endpoint that is never
//! contacted: the competency vocabulary is empty and the commands used here
//! only read the precomputed matrix.

use std::path::Path;
use std::process::{Command, Output};

const DATASET: &str = r#"[
    [
        {"Title": "Robot Arms", "URL": "https://calls.example/robots", "Title_Embedding": [1.0, 0.0]},
        {"Title": "Laser Optics", "URL": "https://calls.example/lasers", "Title_Embedding": [0.0, 1.0]}
    ],
    [
        {"scraped": [["home", {"Title": "Acme", "URL": "https://acme.example"}]], "Summary_Embedding": [1.0, 0.0]},
        {"scraped": [["home", {"Title": "Lumen", "URL": "https://lumen.example"}]], "Summary_Embedding": [0.6, 0.8]}
    ]
]"#;

const CONFIG: &str = r#"
[data]
path = "data.json"

[embedding]
provider = "openai"
model = "offline-test"
api_key = "unused"
base_url = "http://127.0.0.1:9/v1"

[competencies]
terms = []
"#;

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.json"), DATASET).unwrap();
    std::fs::write(dir.path().join(".fundmatch.toml"), CONFIG).unwrap();
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fundmatch"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn matches_for_call_lists_sites() {
    let dir = workspace();
    let output = run(dir.path(), &["matches", "--call", "0"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\n#0 Robot Arms - https://calls.example/robots\nMATCHES WITH\n\n\
         100.0%\n#0 Acme - https://acme.example\n\n\
         60.0%\n#1 Lumen - https://lumen.example\n\n"
    );
}

#[test]
fn global_matches_as_json() {
    let dir = workspace();
    let output = run(
        dir.path(),
        &["matches", "--all", "-n", "2", "--format", "json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["scope"], "all");
    let matches = json["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["score"], 100.0);
    assert_eq!(matches[1]["call"]["title"], "Laser Optics");
    assert_eq!(matches[1]["site"]["title"], "Lumen");
}

#[test]
fn out_of_range_call_warns_and_succeeds() {
    let dir = workspace();
    let output = run(dir.path(), &["matches", "--call", "5"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Call number must be between 0 and 1"));
}

#[test]
fn invalid_site_number_warns() {
    let dir = workspace();
    let output = run(dir.path(), &["details", "0", "first", "--color", "never"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("Input Error: Please enter a valid site number."));
}

#[test]
fn details_show_stored_score() {
    let dir = workspace();
    let output = run(dir.path(), &["details", "1", "1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\n#1 Laser Optics - https://calls.example/lasers\nMATCHED WITH 80.0% TO\n#1 Lumen - https://lumen.example\n\n"
    );
}

#[test]
fn invalid_count_falls_back_to_default() {
    let dir = workspace();
    let output = run(dir.path(), &["matches", "--site", "1", "-n", "-3"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).matches("%\n#").count(), 2);
}

#[test]
fn data_flag_overrides_config() {
    let dir = workspace();
    let output = run(dir.path(), &["matches", "--all", "--data", "missing.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing.json"));
}

#[test]
fn doctor_reports_dataset_shape() {
    let dir = workspace();
    let output = run(dir.path(), &["doctor", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let dataset = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "dataset")
        .unwrap();
    assert_eq!(dataset["status"], "pass");
    assert!(dataset["detail"]
        .as_str()
        .unwrap()
        .contains("2 calls, 2 sites, 2 dimensions"));
}
