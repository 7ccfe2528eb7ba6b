//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use typequiz::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_scalars_and_unions_locales() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let local_config = r#"
locale = "es"
strict = false
tree_path = "quiz/tree.json"
locales = ["fr", "!zh-TW"]
"#;
    fs::write(local_config_path(dir.path()), local_config).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.locale, "es");
    assert!(!settings.strict);
    assert_eq!(settings.tree_path, Some(PathBuf::from("quiz/tree.json")));
    assert!(settings.locales.contains(&"en".to_string()));
    assert!(settings.locales.contains(&"es".to_string()));
    assert!(settings.locales.contains(&"fr".to_string()));
    assert!(
        !settings.locales.contains(&"zh-TW".to_string()),
        "zh-TW should be removed by !zh-TW"
    );
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(Some(dir.path())).expect("load settings");
    assert_eq!(settings.default_locale, "en");
    assert!(settings.locales.contains(&"en".to_string()));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "locale = [").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().starts_with("config error:"), "{err}");
}

#[test]
fn given_settings_when_serialized_then_reloadable() {
    let dir = TempDir::new().unwrap();
    let original = Settings {
        locale: "zh-TW".into(),
        ..Settings::default()
    };
    fs::write(local_config_path(dir.path()), original.to_toml().unwrap()).unwrap();

    let reloaded = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(reloaded.locale, "zh-TW");
    assert_eq!(reloaded.locales, original.locales);
}
