//! Core error types with error code system

use thiserror::Error;

pub use super::error_code::*;

/// Main error type for chain traversal
///
/// Comparison and flattening are total, so the only failure the crate reports
/// is a walk that reaches a node outside the closed scope kind set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Walker reached a scope node whose kind is not recognised
    #[error("{error_code}: unknown scope kind: {description} (type: {type_name})")]
    UnknownScopeKind {
        error_code: ErrorCode,
        /// Concrete type name of the offending node
        type_name: &'static str,
        /// Debug rendering of the offending node
        description: String,
    },
}

impl ScopeError {
    /// Create an unknown scope kind error
    pub fn unknown_scope_kind(type_name: &'static str, description: impl Into<String>) -> Self {
        Self::UnknownScopeKind {
            error_code: CC0001,
            type_name,
            description: description.into(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &ErrorCode {
        match self {
            Self::UnknownScopeKind { error_code, .. } => error_code,
        }
    }

    /// Get error information with help text
    pub fn error_info(&self) -> &'static ErrorInfo {
        self.error_code().info()
    }

    /// Suggested remedy from the error registry
    pub fn help(&self) -> &'static str {
        self.error_info().help
    }

    /// Whether this error came from an unrecognised scope node
    pub fn is_unknown_scope_kind(&self) -> bool {
        matches!(self, Self::UnknownScopeKind { .. })
    }
}

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, ScopeError>;
