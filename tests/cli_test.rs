//! End-to-end tests through the CLI layer

use std::fs;

use clap::Parser;
use rstest::rstest;

use makegen::cli::args::{Commands, SelectionArgs};
use makegen::cli::{execute_command, Cli, CliError};
use makegen::config::{Preset, Settings};
use makegen::domain::EntryFilter;
use makegen::exitcode;
use makegen::util::testing::{init_test_setup, project_fixture};

fn run(args: &[&str]) -> Result<(), CliError> {
    init_test_setup();
    let cli = Cli::try_parse_from(args).expect("parse args");
    execute_command(&cli)
}

#[test]
fn given_no_subcommand_when_run_then_generates_with_defaults() {
    // Arrange
    let temp = project_fixture("Makefile.tpl", "all: EXEC_NAME\n", ".", &["app"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    // Act
    run(&["makegen", "-C", dir]).unwrap();

    // Assert
    assert_eq!(
        fs::read_to_string(temp.path().join("app/Makefile")).unwrap(),
        "all: app\n"
    );
}

#[test]
fn given_template_preset_when_generate_then_writes_under_src() {
    let temp = project_fixture("Makefile.template", "EXEC_NAME", "src", &["lib"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    run(&["makegen", "-C", dir, "generate", "--preset", "template"]).unwrap();

    assert_eq!(
        fs::read_to_string(temp.path().join("src/lib/Makefile")).unwrap(),
        "lib"
    );
}

#[test]
fn given_dry_run_when_generate_then_writes_nothing() {
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["app"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    run(&["makegen", "-C", dir, "generate", "--dry-run"]).unwrap();

    assert!(!temp.path().join("app/Makefile").exists());
}

#[test]
fn given_missing_template_when_generate_then_exit_code_is_noinput() {
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["app"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    let err = run(&["makegen", "-C", dir, "generate", "-t", "absent.tpl"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
    assert!(!temp.path().join("app/Makefile").exists());
}

#[test]
fn given_stale_output_when_check_then_exit_code_is_dataerr() {
    // Arrange
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["a", "b"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();
    run(&["makegen", "-C", dir, "generate"]).unwrap();
    fs::write(temp.path().join("a/Makefile"), "edited by hand").unwrap();

    // Act
    let err = run(&["makegen", "-C", dir, "check"]).unwrap_err();

    // Assert
    assert!(matches!(err, CliError::OutOfDate(1)));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_generated_tree_when_check_then_succeeds() {
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["a"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();
    run(&["makegen", "-C", dir, "generate"]).unwrap();

    run(&["makegen", "-C", dir, "check"]).unwrap();
}

#[test]
fn given_empty_marker_when_generate_then_exit_code_is_config() {
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["a"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    let err = run(&["makegen", "-C", dir, "generate", "--marker", ""]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_missing_project_dir_when_run_then_exit_code_is_usage() {
    let err = run(&["makegen", "-C", "/definitely/not/here", "plan"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_plan_when_run_then_writes_nothing() {
    let temp = project_fixture("Makefile.tpl", "EXEC_NAME", ".", &["a", "b"], &[]).unwrap();
    let dir = temp.path().to_str().unwrap();

    run(&["makegen", "-C", dir, "plan"]).unwrap();

    assert!(!temp.path().join("a/Makefile").exists());
}

#[test]
fn given_conflicting_filter_flags_when_parse_then_rejected() {
    let result = Cli::try_parse_from(["makegen", "generate", "--all-entries", "--dirs-only"]);

    assert!(result.is_err());
}

#[rstest]
#[case(&["makegen", "generate", "--all-entries"], EntryFilter::All)]
#[case(&["makegen", "generate", "--preset", "template"], EntryFilter::All)]
#[case(&["makegen", "generate", "--preset", "template", "--dirs-only"], EntryFilter::Directories)]
#[case(&["makegen", "generate"], EntryFilter::Directories)]
fn selection_flags_set_entry_filter(#[case] args: &[&str], #[case] expected: EntryFilter) {
    let cli = Cli::try_parse_from(args).unwrap();
    let Some(Commands::Generate { selection, .. }) = cli.command else {
        panic!("expected generate");
    };
    let mut settings = Settings::default();

    selection.apply(&mut settings);

    assert_eq!(settings.entries, expected);
}

#[test]
fn selection_excludes_merge_with_configured_ones() {
    let mut settings = Settings {
        exclude: vec!["^build$".into(), "^tmp".into()],
        ..Settings::from_preset(Preset::Tpl)
    };
    let selection = SelectionArgs {
        exclude: vec!["!^tmp".into(), "^docs$".into()],
        ..SelectionArgs::default()
    };

    selection.apply(&mut settings);

    assert_eq!(settings.exclude, vec!["^build$".to_string(), "^docs$".to_string()]);
}
