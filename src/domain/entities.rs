//! Domain entities for template rendering and target selection

use std::fmt;
use std::path::{Path, PathBuf};

use regex::bytes::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Placeholder token written in templates.
pub const DEFAULT_MARKER: &str = "EXEC_NAME";

/// Name of the file generated inside every target directory.
pub const DEFAULT_OUTPUT_NAME: &str = "Makefile";

/// Literal placeholder token replaced during rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(String);

impl Marker {
    /// Create a marker, rejecting the empty string.
    pub fn new(token: impl Into<String>) -> Result<Self, DomainError> {
        let token = token.into();
        if token.is_empty() {
            return Err(DomainError::EmptyMarker);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self(DEFAULT_MARKER.to_string())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Template bytes together with the marker they are rendered with.
///
/// Rendering works on bytes, so templates need not be valid UTF-8.
#[derive(Debug, Clone)]
pub struct Template {
    /// Where the template was read from
    pub source: PathBuf,
    content: Vec<u8>,
    marker: Marker,
    pattern: Regex,
}

impl Template {
    pub fn new(
        source: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
        marker: Marker,
    ) -> Result<Self, DomainError> {
        let pattern = Regex::new(&regex::escape(marker.as_str()))
            .map_err(|e| DomainError::InvalidMarker(e.to_string()))?;
        Ok(Self {
            source: source.into(),
            content: content.into(),
            marker,
            pattern,
        })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Number of marker occurrences in the template.
    pub fn marker_count(&self) -> usize {
        self.pattern.find_iter(&self.content).count()
    }

    /// Replace every occurrence of the marker with `name`.
    pub fn render(&self, name: &str) -> Vec<u8> {
        self.pattern
            .replace_all(&self.content, NoExpand(name.as_bytes()))
            .into_owned()
    }
}

/// Which root entries receive an output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryFilter {
    /// Only entries that are directories; plain files are skipped.
    #[default]
    Directories,
    /// Every entry, assumed to be a directory.
    All,
}

impl fmt::Display for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryFilter::Directories => f.write_str("directories"),
            EntryFilter::All => f.write_str("all"),
        }
    }
}

/// One selected root entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDir {
    /// Entry name, substituted for the marker
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
}

impl TargetDir {
    /// Build a target from an entry path; the file name must be UTF-8.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::InvalidEntryName(path.to_path_buf()))?;
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// Where the generated file for this target lives.
    pub fn output_path(&self, output_name: &str) -> PathBuf {
        self.path.join(output_name)
    }
}

/// Result of processing one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Output file was (re)written
    Written,
    /// Output is not written (dry run)
    Planned,
    /// Existing output matches the rendered template
    Unchanged,
    /// Existing output differs from the rendered template
    Stale,
    /// Output file does not exist
    Missing,
}

impl Outcome {
    /// True when `check` should fail for this outcome.
    pub fn is_out_of_date(&self) -> bool {
        matches!(self, Outcome::Stale | Outcome::Missing)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Written => "written",
            Outcome::Planned => "planned",
            Outcome::Unchanged => "up to date",
            Outcome::Stale => "stale",
            Outcome::Missing => "missing",
        };
        f.write_str(s)
    }
}

/// Per-target line of a generation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: TargetDir,
    pub output: PathBuf,
    pub outcome: Outcome,
}

/// Ordered results of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub targets: Vec<TargetReport>,
}

impl GenerationReport {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.targets.iter().filter(|t| t.outcome == outcome).count()
    }

    pub fn out_of_date(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.outcome.is_out_of_date())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
