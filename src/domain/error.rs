//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent rule violations independent of I/O.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("marker must not be empty")]
    EmptyMarker,

    #[error("invalid marker: {0}")]
    InvalidMarker(String),

    #[error("entry name is not valid UTF-8: {0}")]
    InvalidEntryName(PathBuf),
}
