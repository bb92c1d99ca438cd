//! In-memory storage implementation

use super::traits::*;
use crate::activity::WorkflowActivity;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::RwLock;
use wiki_workflow_types::{PageId, Workflow, WorkflowId};

/// In-memory storage for development and testing
#[derive(Debug)]
pub struct InMemoryStorage {
    workflows: Arc<RwLock<HashMap<WorkflowId, Workflow>>>,
    activities: Arc<RwLock<Vec<WorkflowActivity>>>,
    activity_sequence: Arc<AtomicU64>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
            activities: Arc::new(RwLock::new(Vec::new())),
            activity_sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl WorkflowStorage for InMemoryStorage {
    async fn get_workflow(&self, id: &WorkflowId) -> StorageResult<Option<Workflow>> {
        let workflows = self.workflows.read().await;
        Ok(workflows.get(id).cloned())
    }

    async fn list_workflows_for_page(&self, page_id: &PageId) -> StorageResult<Vec<Workflow>> {
        let workflows = self.workflows.read().await;
        let mut listed: Vec<Workflow> = workflows
            .values()
            .filter(|w| &w.page_id == page_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn has_in_progress_workflow_for_page(&self, page_id: &PageId) -> StorageResult<bool> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .any(|w| &w.page_id == page_id && w.is_in_progress()))
    }

    async fn insert_workflow(&self, workflow: Workflow) -> StorageResult<()> {
        let mut workflows = self.workflows.write().await;

        if workflows.contains_key(&workflow.id) {
            return Err(StorageError::Conflict(format!(
                "workflow {} already exists",
                workflow.id
            )));
        }

        if workflow.is_in_progress()
            && workflows
                .values()
                .any(|w| w.page_id == workflow.page_id && w.is_in_progress())
        {
            return Err(StorageError::Conflict(format!(
                "an in-progress workflow already exists for page {}",
                workflow.page_id
            )));
        }

        workflows.insert(workflow.id, workflow);
        Ok(())
    }

    async fn update_workflow(&self, workflow: Workflow, expected_revision: u64) -> StorageResult<()> {
        let mut workflows = self.workflows.write().await;

        let stored = workflows
            .get(&workflow.id)
            .ok_or_else(|| StorageError::NotFound(format!("workflow {}", workflow.id)))?;

        if stored.revision != expected_revision {
            return Err(StorageError::StaleRevision {
                workflow_id: workflow.id,
                expected: expected_revision,
                actual: stored.revision,
            });
        }

        workflows.insert(workflow.id, workflow);
        Ok(())
    }

    async fn delete_workflow(&self, id: &WorkflowId) -> StorageResult<bool> {
        let mut workflows = self.workflows.write().await;
        Ok(workflows.remove(id).is_some())
    }

    async fn delete_workflows_for_page(&self, page_id: &PageId) -> StorageResult<Vec<WorkflowId>> {
        let mut workflows = self.workflows.write().await;
        let ids: Vec<WorkflowId> = workflows
            .values()
            .filter(|w| &w.page_id == page_id)
            .map(|w| w.id)
            .collect();

        for id in &ids {
            workflows.remove(id);
        }

        Ok(ids)
    }
}

#[async_trait]
impl ActivityStorage for InMemoryStorage {
    async fn store_activity(&self, mut activity: WorkflowActivity) -> StorageResult<WorkflowActivity> {
        if activity.sequence == 0 {
            activity.sequence = self.activity_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        }

        let mut activities = self.activities.write().await;
        activities.push(activity.clone());

        Ok(activity)
    }

    async fn list_activities(&self, workflow_id: &WorkflowId) -> StorageResult<Vec<WorkflowActivity>> {
        let activities = self.activities.read().await;
        Ok(activities
            .iter()
            .filter(|a| &a.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn delete_activities_for_workflow(&self, workflow_id: &WorkflowId) -> StorageResult<usize> {
        let mut activities = self.activities.write().await;
        let before = activities.len();
        activities.retain(|a| &a.workflow_id != workflow_id);
        Ok(before - activities.len())
    }
}

impl Storage for InMemoryStorage {}
