//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (the `tpl` preset)
//! 2. Global config: `$XDG_CONFIG_HOME/makegen/makegen.toml`
//! 3. Project config: `<project_dir>/.makegen.toml` or an explicit `--config` file
//! 4. Environment variables: `MAKEGEN_*` prefix
//!
//! CLI flags are applied on top by the command layer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::GenerateRequest;
use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, EntryFilter, Marker, DEFAULT_MARKER, DEFAULT_OUTPUT_NAME};

/// File name of the project-local config.
pub const PROJECT_CONFIG_NAME: &str = ".makegen.toml";

/// Named root/template/filter combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// `.` with `Makefile.tpl`, directories only
    Tpl,
    /// `./src` with `Makefile.template`, every entry
    Template,
}

impl Preset {
    pub fn root(&self) -> PathBuf {
        match self {
            Preset::Tpl => PathBuf::from("."),
            Preset::Template => PathBuf::from("./src"),
        }
    }

    pub fn template(&self) -> PathBuf {
        match self {
            Preset::Tpl => PathBuf::from("Makefile.tpl"),
            Preset::Template => PathBuf::from("Makefile.template"),
        }
    }

    pub fn entries(&self) -> EntryFilter {
        match self {
            Preset::Tpl => EntryFilter::Directories,
            Preset::Template => EntryFilter::All,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub preset: Option<Preset>,
    pub root: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub marker: Option<String>,
    pub output_name: Option<String>,
    pub entries: Option<EntryFilter>,
    pub exclude: Option<Vec<String>>,
}

/// Unified configuration for makegen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory whose immediate entries receive an output file
    pub root: PathBuf,
    /// Template file
    pub template: PathBuf,
    /// Placeholder token (default: EXEC_NAME)
    pub marker: String,
    /// Generated file name (default: Makefile)
    pub output_name: String,
    /// Which entries are targets
    pub entries: EntryFilter,
    /// Regex patterns for entry names to skip
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::Tpl)
    }
}

/// Get the XDG config directory for makegen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "makegen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("makegen.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_NAME)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Parse an entry filter name as used in env vars.
fn parse_entry_filter(value: &str) -> Result<EntryFilter, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "directories" | "dirs" => Ok(EntryFilter::Directories),
        "all" => Ok(EntryFilter::All),
        other => Err(ApplicationError::Config {
            message: format!("invalid entries value '{}': expected 'directories' or 'all'", other),
        }),
    }
}

impl Settings {
    /// Defaults for one preset.
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            root: preset.root(),
            template: preset.template(),
            marker: DEFAULT_MARKER.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            entries: preset.entries(),
            exclude: Vec::new(),
        }
    }

    /// Switch root, template and filter to those of `preset`.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.root = preset.root();
        self.template = preset.template();
        self.entries = preset.entries();
    }

    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base).
    ///
    /// - A preset resets root, template and filter before the other keys apply
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - `exclude`: union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut base = self.clone();
        if let Some(preset) = overlay.preset {
            base.apply_preset(preset);
        }
        Self {
            root: overlay.root.clone().unwrap_or(base.root),
            template: overlay.template.clone().unwrap_or(base.template),
            marker: overlay.marker.clone().unwrap_or(base.marker),
            output_name: overlay.output_name.clone().unwrap_or(base.output_name),
            entries: overlay.entries.unwrap_or(base.entries),
            exclude: overlay
                .exclude
                .as_ref()
                .map(|o| Self::merge_array(&base.exclude, o))
                .unwrap_or(base.exclude),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.root = PathBuf::from(expand_env_vars(self.root.to_string_lossy().as_ref()));
        self.template = PathBuf::from(expand_env_vars(self.template.to_string_lossy().as_ref()));
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Directory searched for `.makegen.toml`
    /// * `config_file` - Explicit project config; must exist when given
    pub fn load(project_dir: &Path, config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        match config_file {
            Some(path) => {
                debug!("load: explicit config {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let local_path = project_config_path(project_dir);
                if local_path.exists() {
                    debug!("load: project config {}", local_path.display());
                    current = current.merge_with(&load_raw_settings(&local_path)?);
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply MAKEGEN_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge). `MAKEGEN_EXCLUDE` is comma separated.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("MAKEGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("exclude"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("preset") {
            let preset = match val.trim().to_ascii_lowercase().as_str() {
                "tpl" => Preset::Tpl,
                "template" => Preset::Template,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("invalid preset '{}': expected 'tpl' or 'template'", other),
                    })
                }
            };
            settings.apply_preset(preset);
        }
        if let Ok(val) = config.get_string("root") {
            settings.root = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("template") {
            settings.template = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("marker") {
            settings.marker = val;
        }
        if let Ok(val) = config.get_string("output_name") {
            settings.output_name = val;
        }
        if let Ok(val) = config.get_string("entries") {
            settings.entries = parse_entry_filter(&val)?;
        }
        if let Ok(val) = config.get::<Vec<String>>("exclude") {
            settings.exclude = val.into_iter().filter(|s| !s.is_empty()).collect();
        }

        Ok(settings)
    }

    /// Resolve paths against `project_dir` and validate the marker.
    pub fn to_request(&self, project_dir: &Path) -> Result<GenerateRequest, ApplicationError> {
        let name = self.output_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ApplicationError::Config {
                message: format!("invalid output name '{}'", self.output_name),
            });
        }
        Ok(GenerateRequest {
            root: project_dir.join(&self.root),
            template: project_dir.join(&self.template),
            marker: Marker::new(self.marker.clone())?,
            output_name: self.output_name.clone(),
            entries: self.entries,
            exclude: self.exclude.clone(),
        })
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
