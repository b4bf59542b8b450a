//! CLI-level errors (wraps infrastructure errors)

use std::io::ErrorKind;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0} generated file(s) missing or out of date")]
    OutOfDate(usize),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::OutOfDate(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::TemplateNotFound(_) | ApplicationError::RootNotFound(_) => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::InvalidPattern { .. } => crate::exitcode::USAGE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(
                        DomainError::EmptyMarker | DomainError::InvalidMarker(_),
                    ) => crate::exitcode::CONFIG,
                    ApplicationError::Domain(DomainError::InvalidEntryName(_)) => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::OperationFailed { .. } => match app.io_kind() {
                        Some(ErrorKind::PermissionDenied) => crate::exitcode::NOPERM,
                        _ => crate::exitcode::IOERR,
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_template_maps_to_noinput() {
        let err: CliError = ApplicationError::TemplateNotFound(PathBuf::from("Makefile.tpl")).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn permission_denied_maps_to_noperm() {
        let err: CliError = ApplicationError::OperationFailed {
            context: "write output: a/Makefile".into(),
            source: Box::new(std::io::Error::from(ErrorKind::PermissionDenied)),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::NOPERM);
    }

    #[test]
    fn invalid_entry_name_maps_to_dataerr() {
        let err: CliError =
            ApplicationError::Domain(DomainError::InvalidEntryName(PathBuf::from("src/bad"))).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn out_of_date_maps_to_dataerr() {
        assert_eq!(CliError::OutOfDate(2).exit_code(), crate::exitcode::DATAERR);
    }
}
