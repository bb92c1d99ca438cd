//! Storage trait definitions

use crate::activity::WorkflowActivity;
use crate::error::StorageError;
use async_trait::async_trait;
use wiki_workflow_types::{PageId, Workflow, WorkflowId};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Combined storage trait
#[async_trait]
pub trait Storage: WorkflowStorage + ActivityStorage + Send + Sync {}

/// Storage for workflow aggregates
#[async_trait]
pub trait WorkflowStorage: Send + Sync {
    /// Get a workflow by ID
    async fn get_workflow(&self, id: &WorkflowId) -> StorageResult<Option<Workflow>>;

    /// List the workflows of a page, newest first
    async fn list_workflows_for_page(&self, page_id: &PageId) -> StorageResult<Vec<Workflow>>;

    /// Whether the page already has an in-progress workflow
    async fn has_in_progress_workflow_for_page(&self, page_id: &PageId) -> StorageResult<bool>;

    /// Insert a new workflow.
    ///
    /// Fails with [`StorageError::Conflict`] when the id is taken or when the
    /// workflow is in progress and its page already has one in progress.
    async fn insert_workflow(&self, workflow: Workflow) -> StorageResult<()>;

    /// Replace a stored workflow if its revision is still `expected_revision`
    async fn update_workflow(&self, workflow: Workflow, expected_revision: u64) -> StorageResult<()>;

    /// Delete a workflow by ID
    async fn delete_workflow(&self, id: &WorkflowId) -> StorageResult<bool>;

    /// Delete every workflow of a page, returning the removed ids
    async fn delete_workflows_for_page(&self, page_id: &PageId) -> StorageResult<Vec<WorkflowId>>;
}

/// Storage for workflow activity logs
#[async_trait]
pub trait ActivityStorage: Send + Sync {
    /// Store an activity entry (returns the stored activity with sequence assigned)
    async fn store_activity(&self, activity: WorkflowActivity) -> StorageResult<WorkflowActivity>;

    /// List the activities of a workflow in insertion order
    async fn list_activities(&self, workflow_id: &WorkflowId) -> StorageResult<Vec<WorkflowActivity>>;

    /// Delete the activities of a workflow, returning how many were removed
    async fn delete_activities_for_workflow(&self, workflow_id: &WorkflowId) -> StorageResult<usize>;
}
