//! Stack and stack resource types
//!
//! Stacks and their resources are owned by the infrastructure service.
//! These types are read-only snapshots taken during a single invocation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Provider status string for a resource or stack that failed to delete
pub const DELETE_FAILED: &str = "DELETE_FAILED";

/// Logical status of a stack from the point of view of a delete workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackStatus {
    /// Deletion accepted and running
    DeleteInProgress,
    /// Stack and all resources removed
    DeleteComplete,
    /// Deletion halted, one or more resources could not be removed
    DeleteFailed,
    /// Stack not found (already deleted, or never existed)
    Nonexistent,
    /// Any other status (mid-update, rollback, ...)
    DifferentState,
}

impl StackStatus {
    /// Map a provider status string onto a logical status
    ///
    /// Unknown strings are `DifferentState`, never an error.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            DELETE_FAILED => StackStatus::DeleteFailed,
            _ => StackStatus::DifferentState,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::Nonexistent => "NONEXISTENT",
            StackStatus::DifferentState => "DIFFERENT_STATE",
        }
    }

    /// Whether the workflow stops polling at this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StackStatus::DeleteComplete | StackStatus::DeleteFailed | StackStatus::Nonexistent
        )
    }

    /// Whether the stack is gone
    pub fn is_deleted(&self) -> bool {
        matches!(self, StackStatus::DeleteComplete | StackStatus::Nonexistent)
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current descriptor of a stack as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    /// Stack name
    pub name: String,

    /// Provider status string (e.g., "DELETE_IN_PROGRESS")
    pub status: String,

    /// Reason attached to the status, if the provider reports one
    pub status_reason: Option<String>,
}

impl StackDescription {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            status_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }
}

/// A single managed resource within a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResource {
    /// Provider-assigned physical identifier
    pub physical_id: String,

    /// Provider resource status string
    pub status: String,

    /// Template-level identifier
    pub logical_id: Option<String>,

    /// Resource type (e.g., "AWS::S3::Bucket")
    pub resource_type: Option<String>,
}

impl StackResource {
    pub fn new(physical_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            physical_id: physical_id.into(),
            status: status.into(),
            logical_id: None,
            resource_type: None,
        }
    }

    pub fn with_logical_id(mut self, logical_id: impl Into<String>) -> Self {
        self.logical_id = Some(logical_id.into());
        self
    }

    pub fn with_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn is_delete_failed(&self) -> bool {
        self.status == DELETE_FAILED
    }
}

/// One page of a resource listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePage {
    pub resources: Vec<StackResource>,

    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

impl ResourcePage {
    pub fn new(resources: Vec<StackResource>) -> Self {
        Self {
            resources,
            next_token: None,
        }
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }
}

/// Result of a deletion workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// Stack name
    pub stack: String,

    /// Last observed status
    pub status: StackStatus,

    /// Number of delete requests issued
    pub attempts: u32,

    /// Physical ids submitted for retention across all attempts
    pub retained: BTreeSet<String>,
}

impl DeletionOutcome {
    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }
}
