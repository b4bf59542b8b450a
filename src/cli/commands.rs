//! Command dispatch: resolves settings and runs the generator service

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{display_relative, GenerateRequest};
use crate::cli::args::{Cli, Commands, ConfigCommands, SelectionArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::{GenerationReport, Outcome};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line.
///
/// Without a subcommand, generates with the loaded settings.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    debug!("project_dir: {}", project_dir.display());

    match &cli.command {
        None => cmd_generate(cli, &project_dir, &SelectionArgs::default(), false),
        Some(Commands::Generate { selection, dry_run }) => {
            cmd_generate(cli, &project_dir, selection, *dry_run)
        }
        Some(Commands::Plan { selection }) => cmd_plan(cli, &project_dir, selection),
        Some(Commands::Check { selection }) => cmd_check(cli, &project_dir, selection),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli, &project_dir),
            ConfigCommands::Path => cmd_config_path(cli, &project_dir),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::InvalidArgs(format!(
                    "project directory does not exist: {}",
                    dir.display()
                )));
            }
            Ok(dir.to_path_buf())
        }
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("determine current directory", e))),
    }
}

/// Load settings and apply CLI flags on top.
fn build_container(
    cli: &Cli,
    project_dir: &Path,
    selection: &SelectionArgs,
) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(project_dir, cli.config.as_deref())?;
    selection.apply(&mut settings);
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

fn build_request(container: &ServiceContainer, project_dir: &Path) -> CliResult<GenerateRequest> {
    Ok(container.settings.to_request(project_dir)?)
}

#[instrument(skip(cli))]
fn cmd_generate(
    cli: &Cli,
    project_dir: &Path,
    selection: &SelectionArgs,
    dry_run: bool,
) -> CliResult<()> {
    let container = build_container(cli, project_dir, selection)?;
    let request = build_request(&container, project_dir)?;
    let generator = container.generator();

    if dry_run {
        let report = generator.plan(&request)?;
        report_empty(&report, &request, project_dir);
        for t in &report.targets {
            output::detail(&format!(
                "would write {}",
                display_relative(&t.output, project_dir)
            ));
        }
        return Ok(());
    }

    let report = generator.generate(&request)?;
    if report_empty(&report, &request, project_dir) {
        return Ok(());
    }
    for t in &report.targets {
        output::success_detail(&display_relative(&t.output, project_dir));
    }
    output::success(&format!(
        "generated {} {}",
        report.count(Outcome::Written),
        request.output_name
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_plan(cli: &Cli, project_dir: &Path, selection: &SelectionArgs) -> CliResult<()> {
    let container = build_container(cli, project_dir, selection)?;
    let request = build_request(&container, project_dir)?;
    let report = container.generator().plan(&request)?;

    if report_empty(&report, &request, project_dir) {
        return Ok(());
    }
    let mut tree = Tree::new(display_relative(&request.root, project_dir));
    for t in &report.targets {
        tree.push(Tree::new(format!("{}/{}", t.target.name, request.output_name)));
    }
    output::info(&tree);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, project_dir: &Path, selection: &SelectionArgs) -> CliResult<()> {
    let container = build_container(cli, project_dir, selection)?;
    let request = build_request(&container, project_dir)?;
    let report = container.generator().check(&request)?;

    if report_empty(&report, &request, project_dir) {
        return Ok(());
    }
    for t in &report.targets {
        let path = display_relative(&t.output, project_dir);
        if t.outcome.is_out_of_date() {
            output::failure(&format!("{} ({})", path, t.outcome));
        } else {
            output::success_detail(&path);
        }
    }
    match report.out_of_date() {
        0 => {
            output::success(&format!("{} up to date", report.targets.len()));
            Ok(())
        }
        n => Err(CliError::OutOfDate(n)),
    }
}

fn cmd_config_show(cli: &Cli, project_dir: &Path) -> CliResult<()> {
    let settings = Settings::load(project_dir, cli.config.as_deref())?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(cli: &Cli, project_dir: &Path) -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::action("global", &describe_config(&path)),
        None => output::action("global", "<unavailable>"),
    }
    let project = cli
        .config
        .clone()
        .unwrap_or_else(|| project_config_path(project_dir));
    output::action("project", &describe_config(&project));
    Ok(())
}

fn describe_config(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

/// Warn when nothing was selected; returns true if the report is empty.
fn report_empty(report: &GenerationReport, request: &GenerateRequest, project_dir: &Path) -> bool {
    if report.is_empty() {
        output::warning(&format!(
            "no target directories under {}",
            display_relative(&request.root, project_dir)
        ));
    }
    report.is_empty()
}
