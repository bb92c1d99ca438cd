//! Response bodies: the `{"data": ...}` envelope and workflow views

use chrono::{DateTime, Utc};
use serde::Serialize;
use wiki_workflow_service::WorkflowActivity;
use wiki_workflow_types::{
    ApproverGroup, ApproverGroupState, PageId, UserId, Workflow, WorkflowId, WorkflowStatus,
};

/// Successful response body
#[derive(Debug, Serialize)]
pub struct ApiData<T> {
    pub data: T,
}

impl<T> ApiData<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A group with its derived gating state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverGroupView {
    #[serde(flatten)]
    pub group: ApproverGroup,
    pub is_approved: bool,
    pub state: ApproverGroupState,
}

/// A workflow as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub id: WorkflowId,
    pub creator: UserId,
    pub page_id: PageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: WorkflowStatus,
    pub approver_groups: Vec<ApproverGroupView>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Workflow> for WorkflowView {
    fn from(workflow: Workflow) -> Self {
        let states = workflow.group_states();
        let approver_groups = workflow
            .approver_groups
            .into_iter()
            .zip(states)
            .map(|(group, state)| ApproverGroupView {
                is_approved: group.is_approved(),
                group,
                state,
            })
            .collect();

        Self {
            id: workflow.id,
            creator: workflow.creator,
            page_id: workflow.page_id,
            name: workflow.name,
            comment: workflow.comment,
            status: workflow.status,
            approver_groups,
            revision: workflow.revision,
            created_at: workflow.created_at,
            updated_at: workflow.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowList {
    pub workflows: Vec<WorkflowView>,
}

#[derive(Debug, Serialize)]
pub struct ActivityList {
    pub activities: Vec<WorkflowActivity>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}
