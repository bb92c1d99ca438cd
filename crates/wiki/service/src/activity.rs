//! Audit records of what happened to a workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wiki_workflow_types::{UserId, WorkflowId};

/// Kind of change recorded by an activity entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Created,
    Updated,
    ApproverGroupEdited,
    ApproverStatusChanged,
    Approved,
    Rejected,
}

/// One entry of a workflow's activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowActivity {
    pub id: Uuid,
    /// Assigned by storage, increasing in insertion order
    pub sequence: u64,
    pub workflow_id: WorkflowId,
    pub actor: UserId,
    pub action: ActivityAction,
    pub at: DateTime<Utc>,
}

impl WorkflowActivity {
    pub fn new(workflow_id: WorkflowId, actor: UserId, action: ActivityAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            workflow_id,
            actor,
            action,
            at: Utc::now(),
        }
    }
}
