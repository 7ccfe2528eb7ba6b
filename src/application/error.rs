//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("tree file not found: {0}")]
    TreeNotFound(PathBuf),

    #[error("cannot parse tree {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tree {source_name} failed validation with {count} error(s)")]
    InvalidTree { source_name: String, count: usize },

    #[error("no result for type code '{0}'")]
    ResultNotFound(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True when the tree content, not the caller, is at fault.
    pub fn is_content_fault(&self) -> bool {
        match self {
            ApplicationError::Domain(e) => e.is_content_fault(),
            ApplicationError::Parse { .. } | ApplicationError::InvalidTree { .. } => true,
            _ => false,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
