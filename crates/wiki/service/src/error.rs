//! Error types for the workflow service

use thiserror::Error;
use wiki_workflow_types::{ApproverGroupId, ApproverStatus, UserId, WorkflowId};

/// A violated structural rule of a workflow's approver groups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("workflow must have at least one approver group")]
    NoApproverGroups,

    #[error("approver group {index} has no approvers")]
    EmptyApproverGroup { index: usize },

    #[error("workflow creator {user} cannot be an approver (approver group {index})")]
    CreatorAsApprover { index: usize, user: UserId },

    #[error("user {user} appears more than once in approver group {index}")]
    DuplicateApprover { index: usize, user: UserId },

    #[error("approver group {index} is at or before the latest approved group and cannot be changed")]
    ApprovedGroupAltered { index: usize },

    #[error("approver group {0} does not exist in this workflow")]
    UnknownApproverGroup(ApproverGroupId),

    #[error("user {user} is both added to and removed from approver group {group_id}")]
    ConflictingApproverEdit { group_id: ApproverGroupId, user: UserId },

    #[error("approver group offset {offset} is out of range for {len} groups")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("approver status {0:?} cannot be set explicitly")]
    UnsettableStatus(ApproverStatus),

    #[error("delegation requires a delegated user id")]
    MissingDelegate,

    #[error("cannot delegate to {user}: {reason}")]
    InvalidDelegate { user: UserId, reason: &'static str },
}

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict with an existing record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The record changed since it was read
    #[error("workflow {workflow_id} was modified concurrently (expected revision {expected}, found {actual})")]
    StaleRevision {
        workflow_id: WorkflowId,
        expected: u64,
        actual: u64,
    },

    /// Backend failure
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Errors raised by workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Workflow {0} does not exist")]
    NotFound(WorkflowId),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for WorkflowError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(_) | StorageError::StaleRevision { .. } => {
                WorkflowError::Conflict(err.to_string())
            }
            other => WorkflowError::Storage(other),
        }
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::CreatorAsApprover {
            index: 1,
            user: UserId::new("alice"),
        };
        assert_eq!(
            err.to_string(),
            "workflow creator alice cannot be an approver (approver group 1)"
        );
    }

    #[test]
    fn test_stale_revision_maps_to_conflict() {
        let err: WorkflowError = StorageError::StaleRevision {
            workflow_id: WorkflowId::generate(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn test_internal_storage_error_kept() {
        let err: WorkflowError = StorageError::Internal("disk".into()).into();
        assert!(matches!(err, WorkflowError::Storage(StorageError::Internal(_))));
    }
}
