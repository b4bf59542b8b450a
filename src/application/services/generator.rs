//! Build file generation service
//!
//! Enumerates the immediate entries of a root directory and writes the
//! rendered template into each selected entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    EntryFilter, GenerationReport, Marker, Outcome, TargetDir, TargetReport, Template,
    DEFAULT_OUTPUT_NAME,
};
use crate::infrastructure::traits::FileSystem;

/// Fully resolved input for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Directory whose immediate entries are targets
    pub root: PathBuf,
    /// Template file
    pub template: PathBuf,
    /// Placeholder token replaced with each entry name
    pub marker: Marker,
    /// File name written inside each target
    pub output_name: String,
    /// Which entries are targets
    pub entries: EntryFilter,
    /// Regex patterns; matching entry names are skipped
    pub exclude: Vec<String>,
}

impl GenerateRequest {
    /// Request with default marker, output name and filter.
    pub fn new(root: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
            marker: Marker::default(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            entries: EntryFilter::default(),
            exclude: Vec::new(),
        }
    }
}

/// Service for generating per-directory build files.
pub struct GeneratorService {
    fs: Arc<dyn FileSystem>,
}

impl GeneratorService {
    /// Create a new generator service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Render the template into every target and write the output files.
    ///
    /// The template is read before anything is written, so a missing
    /// template leaves the tree untouched. The first I/O failure aborts
    /// the run; files written before it are kept.
    #[instrument(skip(self), fields(root = %request.root.display()))]
    pub fn generate(&self, request: &GenerateRequest) -> ApplicationResult<GenerationReport> {
        let template = self.load_template(request)?;
        let targets = self.select_targets(request)?;

        let mut report = GenerationReport::default();
        for target in targets {
            let output = target.output_path(&request.output_name);
            let rendered = template.render(&target.name);
            self.fs
                .write(&output, &rendered)
                .with_path_context("write output", &output)?;
            info!("generated {}", output.display());
            report.targets.push(TargetReport {
                target,
                output,
                outcome: Outcome::Written,
            });
        }
        Ok(report)
    }

    /// List what `generate` would write, without writing.
    pub fn plan(&self, request: &GenerateRequest) -> ApplicationResult<GenerationReport> {
        // Fails like generate when the template is missing.
        self.load_template(request)?;
        let targets = self.select_targets(request)?;

        let targets = targets
            .into_iter()
            .map(|target| {
                let output = target.output_path(&request.output_name);
                TargetReport {
                    target,
                    output,
                    outcome: Outcome::Planned,
                }
            })
            .collect();
        Ok(GenerationReport { targets })
    }

    /// Compare existing output files against the rendered template.
    pub fn check(&self, request: &GenerateRequest) -> ApplicationResult<GenerationReport> {
        let template = self.load_template(request)?;
        let targets = self.select_targets(request)?;

        let mut report = GenerationReport::default();
        for target in targets {
            let output = target.output_path(&request.output_name);
            let outcome = if !self.fs.exists(&output) {
                Outcome::Missing
            } else {
                let current = self
                    .fs
                    .read(&output)
                    .with_path_context("read output", &output)?;
                if current == template.render(&target.name) {
                    Outcome::Unchanged
                } else {
                    Outcome::Stale
                }
            };
            debug!("check: {} is {}", output.display(), outcome);
            report.targets.push(TargetReport {
                target,
                output,
                outcome,
            });
        }
        Ok(report)
    }

    /// Read the template file.
    pub fn load_template(&self, request: &GenerateRequest) -> ApplicationResult<Template> {
        let path = &request.template;
        if !self.fs.exists(path) {
            return Err(ApplicationError::TemplateNotFound(path.clone()));
        }
        let content = self
            .fs
            .read(path)
            .with_path_context("read template", path)?;
        let template = Template::new(path.clone(), content, request.marker.clone())?;

        if template.marker_count() == 0 {
            warn!(
                "template {} does not contain marker '{}'",
                path.display(),
                request.marker
            );
        }
        debug!(
            "load_template: {} ({} markers)",
            path.display(),
            template.marker_count()
        );
        Ok(template)
    }

    /// Immediate entries of the root that receive an output file, by name.
    pub fn select_targets(&self, request: &GenerateRequest) -> ApplicationResult<Vec<TargetDir>> {
        let root = &request.root;
        if !self.fs.is_dir(root) {
            return Err(ApplicationError::RootNotFound(root.clone()));
        }
        let excludes = compile_excludes(&request.exclude)?;

        let entries = self
            .fs
            .list_dir(root)
            .with_path_context("list directory", root)?;

        let mut targets = Vec::new();
        for entry in entries {
            if request.entries == EntryFilter::Directories && !self.fs.is_dir(&entry) {
                debug!("skip non-directory: {}", entry.display());
                continue;
            }
            let target = TargetDir::from_path(&entry)?;
            if excludes.iter().any(|re| re.is_match(&target.name)) {
                debug!("skip excluded: {}", target.name);
                continue;
            }
            targets.push(target);
        }
        debug!(
            "select_targets: {} targets under {}",
            targets.len(),
            root.display()
        );
        Ok(targets)
    }
}

fn compile_excludes(patterns: &[String]) -> ApplicationResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ApplicationError::InvalidPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Path of `path` relative to `base`, for display.
pub fn display_relative(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}
