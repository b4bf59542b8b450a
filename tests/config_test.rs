//! Integration tests for Settings loading with layered merge semantics.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test project config merging with defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use makegen::application::ApplicationError;
use makegen::config::{Preset, Settings};
use makegen::domain::EntryFilter;

#[test]
fn given_no_project_config_when_load_then_returns_tpl_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(project.path(), None).expect("load settings");

    // Assert
    assert_eq!(settings.template, PathBuf::from("Makefile.tpl"));
    assert_eq!(settings.root, PathBuf::from("."));
    assert_eq!(settings.entries, EntryFilter::Directories);
    assert_eq!(settings.marker, "EXEC_NAME");
}

#[test]
fn given_project_config_when_load_then_overrides_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();
    let config = r#"
root = "modules"
marker = "@MODULE@"
output_name = "GNUmakefile"
entries = "all"
"#;
    fs::write(project.path().join(".makegen.toml"), config).unwrap();

    // Act
    let settings = Settings::load(project.path(), None).expect("load settings");

    // Assert
    assert_eq!(settings.root, PathBuf::from("modules"));
    assert_eq!(settings.marker, "@MODULE@");
    assert_eq!(settings.output_name, "GNUmakefile");
    assert_eq!(settings.entries, EntryFilter::All);
    // Not specified: inherited from defaults
    assert_eq!(settings.template, PathBuf::from("Makefile.tpl"));
}

#[test]
fn given_preset_in_project_config_when_load_then_uses_template_layout() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(".makegen.toml"), "preset = \"template\"\n").unwrap();

    let settings = Settings::load(project.path(), None).expect("load settings");

    assert_eq!(settings, Settings::from_preset(Preset::Template));
}

#[test]
fn given_explicit_config_file_when_load_then_ignores_project_config() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(".makegen.toml"), "marker = \"LOCAL\"\n").unwrap();
    let explicit = project.path().join("other.toml");
    fs::write(&explicit, "marker = \"EXPLICIT\"\n").unwrap();

    // Act
    let settings = Settings::load(project.path(), Some(&explicit)).expect("load settings");

    // Assert
    assert_eq!(settings.marker, "EXPLICIT");
}

#[test]
fn given_missing_explicit_config_when_load_then_returns_config_error() {
    let project = TempDir::new().unwrap();
    let missing = project.path().join("missing.toml");

    let result = Settings::load(project.path(), Some(&missing));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_load_then_returns_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(".makegen.toml"), "entries = \"sometimes\"\n").unwrap();

    let result = Settings::load(project.path(), None);

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains(".makegen.toml")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_exclude_with_negation_when_load_then_negated_entry_is_dropped() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join(".makegen.toml"),
        "exclude = [\"^build$\", \"^\\\\.\", \"!^build$\"]\n",
    )
    .unwrap();

    let settings = Settings::load(project.path(), None).expect("load settings");

    assert_eq!(settings.exclude, vec![r"^\.".to_string()]);
}

#[test]
fn given_settings_when_to_toml_then_round_trips_through_load() {
    // Arrange
    let project = TempDir::new().unwrap();
    let mut original = Settings::from_preset(Preset::Template);
    original.exclude = vec!["^tmp".into()];
    fs::write(project.path().join(".makegen.toml"), original.to_toml().unwrap()).unwrap();

    // Act
    let loaded = Settings::load(project.path(), None).expect("load settings");

    // Assert
    assert_eq!(loaded, original);
}
