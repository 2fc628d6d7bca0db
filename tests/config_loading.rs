//! Configuration loading from files and the environment.

use sampleq::config::Settings;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let file = write_config(
        r#"
[acquisition]
capacity = 16
period = "5ms"

[processing]
gain = 0.5
"#,
    );

    let settings = Settings::load_from(file.path()).unwrap();
    assert_eq!(settings.acquisition.capacity, 16);
    assert_eq!(settings.acquisition.period, Duration::from_millis(5));
    assert_eq!(settings.processing.gain, 0.5);
    // Untouched sections keep their defaults.
    assert_eq!(settings.processing.period, Duration::from_millis(100));
    assert_eq!(settings.command.fetch_token, "obter");
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let file = write_config("[processing]\ngain = 0.5\n");

    std::env::set_var("SAMPLEQ_PROCESSING__GAIN", "4.0");
    std::env::set_var("SAMPLEQ_COMMAND__FETCH_TOKEN", "fetch");
    let result = Settings::load_from(file.path());
    std::env::remove_var("SAMPLEQ_PROCESSING__GAIN");
    std::env::remove_var("SAMPLEQ_COMMAND__FETCH_TOKEN");

    let settings = result.unwrap();
    assert_eq!(settings.processing.gain, 4.0);
    assert_eq!(settings.command.fetch_token, "fetch");
}

#[test]
#[serial]
fn test_invalid_values_are_rejected_at_load() {
    let file = write_config("[acquisition]\ncapacity = 1\n");
    let err = Settings::load_from(file.path()).unwrap_err();
    assert!(err.to_string().contains("acquisition.capacity"));

    let file = write_config("[status]\nperiod = \"soon\"\n");
    assert!(Settings::load_from(file.path()).is_err());
}

#[test]
#[serial]
fn test_shipped_config_file_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/sampleq.toml");
    let settings = Settings::load_from(path).unwrap();
    assert_eq!(settings, Settings::default());
}
