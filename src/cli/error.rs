//! CLI-level errors (wraps infrastructure errors)

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

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::OptionOutOfRange { .. })
                    | ApplicationError::ResultNotFound(_) => crate::exitcode::USAGE,
                    ApplicationError::TreeNotFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Domain(_)
                    | ApplicationError::Parse { .. }
                    | ApplicationError::InvalidTree { .. } => crate::exitcode::DATAERR,
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
    fn given_user_input_error_when_mapping_exit_code_then_usage() {
        let err: CliError = DomainError::OptionOutOfRange {
            node: "q1".into(),
            index: 3,
            len: 2,
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }

    #[test]
    fn given_content_fault_when_mapping_exit_code_then_dataerr() {
        let err: CliError = DomainError::MalformedTree { key: "x".into() }.into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_tree_file_when_mapping_exit_code_then_noinput() {
        let err: CliError = ApplicationError::TreeNotFound(PathBuf::from("nope.json")).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_usage_error_when_mapping_exit_code_then_usage() {
        let err = CliError::Usage("config already exists".into());
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
        assert_eq!(err.to_string(), "config already exists");
    }
}
