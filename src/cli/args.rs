//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::{Preset, Settings};
use crate::domain::EntryFilter;

/// Generate per-directory Makefiles from a template by substituting the directory name
#[derive(Parser, Debug)]
#[command(name = "makegen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Config file (default: <project>/.makegen.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the rendered template into every target directory
    Generate {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Show what would be written without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show target directories as a tree
    Plan {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Report generated files that are missing or out of date
    Check {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings as TOML
    Show,
    /// Print config file locations
    Path,
}

/// Flags selecting root, template and targets; override loaded settings.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Start from a preset (applied before the other flags)
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Directory whose immediate entries receive an output file
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Template file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub template: Option<PathBuf>,

    /// Placeholder token replaced with the directory name
    #[arg(short, long)]
    pub marker: Option<String>,

    /// Name of the generated file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Treat every root entry as a target
    #[arg(long, conflicts_with = "dirs_only")]
    pub all_entries: bool,

    /// Skip root entries that are not directories
    #[arg(long)]
    pub dirs_only: bool,

    /// Skip entries whose name matches this regex (repeatable, `!pat` removes a configured one)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
}

impl SelectionArgs {
    /// Apply flags on top of loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(preset) = self.preset {
            settings.apply_preset(preset);
        }
        if let Some(root) = &self.root {
            settings.root = root.clone();
        }
        if let Some(template) = &self.template {
            settings.template = template.clone();
        }
        if let Some(marker) = &self.marker {
            settings.marker = marker.clone();
        }
        if let Some(output) = &self.output {
            settings.output_name = output.clone();
        }
        if self.all_entries {
            settings.entries = EntryFilter::All;
        }
        if self.dirs_only {
            settings.entries = EntryFilter::Directories;
        }
        if !self.exclude.is_empty() {
            settings.exclude = Settings::merge_array(&settings.exclude, &self.exclude);
        }
    }
}
