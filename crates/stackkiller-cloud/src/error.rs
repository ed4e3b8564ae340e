//! Stack deletion error types

use crate::stack::StackStatus;
use thiserror::Error;

/// Transport or API failure reported by a stack-management client
///
/// Provider adapters convert their SDK errors into this shape so the
/// classifier can recognise "not found" without knowing the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Provider error code (e.g., "ValidationError")
    pub code: Option<String>,

    /// Human-readable message returned by the service
    pub message: String,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Whether the service is telling us the stack is absent
    pub fn is_not_found(&self) -> bool {
        self.message.trim_end().ends_with("does not exist")
    }
}

/// Stack deletion errors
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error(
        "Timed out waiting for stack '{stack}' to be deleted after {attempts} attempts (last status: {last_status})"
    )]
    WaitTimeout {
        stack: String,
        attempts: u32,
        last_status: StackStatus,
    },

    #[error("Resource listing for stack '{stack}' did not finish within {pages} pages")]
    PaginationExhausted { stack: String, pages: u32 },

    #[error("Deletion of stack '{stack}' was cancelled")]
    Cancelled { stack: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StackError {
    /// Errors that mean the wait ran out rather than the request being rejected
    pub(crate) fn is_wait_failure(&self) -> bool {
        matches!(self, StackError::WaitTimeout { .. } | StackError::Service(_))
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
