//! Error code system in the style of compiler diagnostics (CC0001, CC0002, ...)
//!
//! Codes are stable across releases so callers can match on them in logs and
//! tests without depending on message text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error categories for organizing error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Chain traversal errors (CC0001-CC0050)
    Traversal,
    /// Anything outside the known ranges
    Unknown,
}

/// Error code following the compiler pattern (CC0001, CC0002, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    pub code: u16,
}

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self { code }
    }

    /// Get the full error code string (e.g., "CC0001")
    pub fn code_str(&self) -> String {
        format!("CC{:04}", self.code)
    }

    /// Get error information from the registry
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_REGISTRY.get_error_info(self)
    }

    /// Get error category for this error code
    pub fn category(&self) -> ErrorCategory {
        match self.code {
            1..=50 => ErrorCategory::Traversal,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Get human-readable description for this error code
    pub fn description(&self) -> &'static str {
        self.info().title
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC{:04}", self.code)
    }
}

/// Error information with help text
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Error code number
    pub code: u16,
    /// Human-readable error title
    pub title: &'static str,
    /// Detailed description of the error
    pub description: &'static str,
    /// Help information and suggested solutions
    pub help: &'static str,
}

impl ErrorInfo {
    pub const fn new(
        code: u16,
        title: &'static str,
        description: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            code,
            title,
            description,
            help,
        }
    }
}

/// Central error registry containing all error definitions
pub struct ErrorRegistry;

impl ErrorRegistry {
    /// Get error information for a given error code
    pub fn get_error_info(&self, error_code: &ErrorCode) -> &'static ErrorInfo {
        match error_code.code {
            1 => &CC0001_INFO,
            _ => &UNKNOWN_ERROR_INFO,
        }
    }
}

/// Global error registry instance
pub static ERROR_REGISTRY: ErrorRegistry = ErrorRegistry;

// Traversal Error Codes (CC0001-CC0050)
pub const CC0001: ErrorCode = ErrorCode::new(1); // Unknown scope kind

static CC0001_INFO: ErrorInfo = ErrorInfo::new(
    1,
    "Unknown scope kind",
    "The walker reached a scope node that does not belong to the closed set of \
     root, cancel, deadline, value and flattened-value scopes. Its parent link \
     cannot be followed, so the traversal stops instead of skipping the node.",
    "Bridged third-party scopes cannot be traversed. Rebuild the chain with \
     `Context::with_value`, `with_cancel` or `with_deadline`, or flatten the part \
     of the chain below the foreign scope.",
);

static UNKNOWN_ERROR_INFO: ErrorInfo = ErrorInfo::new(
    0,
    "Unknown error",
    "No registry entry exists for this error code.",
    "Report the code together with the surrounding log output.",
);
