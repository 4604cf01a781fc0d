//! Integration tests for the OutfitAI CLI

use std::process::{Command, Output};

fn outfitai(cache_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_outfitai"));
    command
        .env("OUTFITAI_CACHE__LOCATION", cache_dir)
        .env_remove("RUST_LOG")
        .env_remove("OPENWEATHER_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("HF_API_TOKEN");
    command
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OutfitAI"));
    assert!(stdout.contains("advise"));
    assert!(stdout.contains("evaluate"));
}

#[test]
fn test_evaluate_cold_light_garment() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path())
        .args(["evaluate", "--label", "light jacket", "--temperature", "5"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Weather is too cold! A light garment is not acceptable."));
}

#[test]
fn test_evaluate_negative_temperature_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path())
        .args([
            "evaluate",
            "--label",
            "Winter Coat",
            "--temperature",
            "-12.5",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["garment"], "winter coat");
    assert_eq!(value["verdict"], "suitable");
}

/// Test error handling for an empty label
#[test]
fn test_evaluate_empty_label_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path())
        .args(["evaluate", "--label", "", "--temperature", "20"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input"));
    assert!(stderr.contains("Garment label cannot be empty"));
}

#[test]
fn test_evaluate_rejects_nan() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path())
        .args(["evaluate", "--label", "coat", "--temperature", "NaN"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("finite"));
}

/// Advise needs a readable image before anything else happens
#[test]
fn test_advise_missing_image() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(dir.path())
        .args(["advise", "--image", "/definitely/not/here.jpg"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File operation failed"), "{stderr}");
}

#[test]
fn test_advise_requires_weather_key() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("shirt.jpg");
    std::fs::write(&image, b"not really a jpeg").unwrap();

    let output = outfitai(dir.path())
        .args(["advise", "--image"])
        .arg(&image)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Weather API key is required"));
}

#[test]
fn test_last_without_history() {
    let dir = tempfile::tempdir().unwrap();
    let output = outfitai(&dir.path().join("cache")).arg("last").output().unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("No garment classified yet."));
}

/// Full advise run against mocked classifier, weather and chat APIs
#[test]
fn test_advise_end_to_end() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/classify")
        .with_status(200)
        .with_body(r#"[{"label":"trench coat","score":0.83},{"label":"cardigan","score":0.04}]"#)
        .create();
    server
        .mock("GET", "/weather")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"name":"Baku","dt":1700000000,"main":{"temp":29.0},"weather":[{"description":"clear sky"}]}"#)
        .create();
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Leave the coat at home."}}]}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let image = dir.path().join("coat.jpg");
    std::fs::write(&image, b"fake image bytes").unwrap();

    let output = outfitai(&cache_dir)
        .env("OUTFITAI_CLASSIFIER__ENDPOINT", format!("{}/classify", server.url()))
        .env("OUTFITAI_WEATHER__BASE_URL", server.url())
        .env("OUTFITAI_WEATHER__API_KEY", "test_weather_key")
        .env("OUTFITAI_SUGGESTION__BASE_URL", server.url())
        .env("OUTFITAI_SUGGESTION__API_KEY", "sk-test-key-123")
        .args(["advise", "--image"])
        .arg(&image)
        .output()
        .unwrap();

    let all = combined(&output);
    assert!(output.status.success(), "{all}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Garment type: trench coat"));
    assert!(stdout.contains("Air temperature: 29.0°C"));
    assert!(stdout.contains("Leave the coat at home."));
    assert!(stdout.contains("This garment is not suitable for very hot weather."));
}
