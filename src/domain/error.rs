//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors fall into two groups: user input errors (bad option index)
/// and content-integrity faults (the tree itself is broken).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("option index {index} out of range: node '{node}' has {len} options")]
    OptionOutOfRange {
        node: String,
        index: usize,
        len: usize,
    },

    #[error("malformed tree: node '{key}' does not exist")]
    MalformedTree { key: String },

    #[error("missing translation for {context}: neither '{locale}' nor default '{default_locale}' present")]
    MissingTranslation {
        context: String,
        locale: String,
        default_locale: String,
    },
}

impl DomainError {
    /// Content-integrity faults indicate an authoring bug in the tree.
    pub fn is_content_fault(&self) -> bool {
        !matches!(self, DomainError::OptionOutOfRange { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_out_of_range_when_classifying_then_is_user_error() {
        let err = DomainError::OptionOutOfRange {
            node: "q1".into(),
            index: 5,
            len: 2,
        };
        assert!(!err.is_content_fault());
        assert!(err.to_string().contains("q1"));
    }

    #[test]
    fn given_missing_node_when_classifying_then_is_content_fault() {
        let err = DomainError::MalformedTree { key: "gone".into() };
        assert!(err.is_content_fault());
        assert_eq!(err.to_string(), "malformed tree: node 'gone' does not exist");
    }
}
