//! Sequential approval gating
//!
//! Only the first non-approved group is actionable. An approver decision is
//! applied to the operator's slot in that group; when the last group becomes
//! approved the whole workflow is approved.

use crate::error::{ValidationError, WorkflowError, WorkflowResult};
use wiki_workflow_types::{ApproverStatus, UserId, Workflow, WorkflowStatus};

/// A decision an approver can take on their slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverDecision {
    Approve,
    Skip,
    Delegate(UserId),
}

impl ApproverDecision {
    /// Interpret a requested status and optional delegate
    pub fn from_request(
        status: ApproverStatus,
        delegated_user_id: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        match status {
            ApproverStatus::Approve => Ok(ApproverDecision::Approve),
            ApproverStatus::Skip => Ok(ApproverDecision::Skip),
            ApproverStatus::Delegate => delegated_user_id
                .map(ApproverDecision::Delegate)
                .ok_or(ValidationError::MissingDelegate),
            ApproverStatus::None => Err(ValidationError::UnsettableStatus(status)),
        }
    }

    pub fn status(&self) -> ApproverStatus {
        match self {
            ApproverDecision::Approve => ApproverStatus::Approve,
            ApproverDecision::Skip => ApproverStatus::Skip,
            ApproverDecision::Delegate(_) => ApproverStatus::Delegate,
        }
    }
}

/// What a decision changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub group_index: usize,
    pub group_approved: bool,
    pub workflow_approved: bool,
}

/// Apply `operator`'s decision to their slot in the actionable group
pub fn apply_decision(
    workflow: &mut Workflow,
    operator: &UserId,
    decision: ApproverDecision,
) -> WorkflowResult<DecisionOutcome> {
    if !workflow.is_in_progress() {
        return Err(WorkflowError::State(format!(
            "workflow {} is not in progress",
            workflow.id
        )));
    }

    let group_index = workflow
        .actionable_group_index()
        .ok_or_else(|| WorkflowError::State("workflow has no actionable approver group".into()))?;

    let creator = workflow.creator.clone();
    let group = &mut workflow.approver_groups[group_index];

    if let ApproverDecision::Delegate(to) = &decision {
        let reason = if to == &creator {
            Some("the workflow creator cannot approve")
        } else if to == operator {
            Some("cannot delegate to oneself")
        } else if group.involves(to) {
            Some("already takes part in the approver group")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ValidationError::InvalidDelegate {
                user: to.clone(),
                reason,
            }
            .into());
        }
    }

    let involved = group.involves(operator);
    let slot = match group.acting_slot_mut(operator) {
        Some(slot) => slot,
        None if involved => {
            return Err(WorkflowError::State(format!(
                "{operator} has no pending decision in the actionable approver group"
            )))
        }
        None => {
            return Err(WorkflowError::Authorization(format!(
                "{operator} is not an approver of the actionable approver group"
            )))
        }
    };

    match decision {
        ApproverDecision::Approve => slot.approve(),
        ApproverDecision::Skip => slot.skip(),
        ApproverDecision::Delegate(to) => slot.delegate(to),
    }

    let group_approved = group.is_approved();
    let workflow_approved = settle_approval(workflow);

    Ok(DecisionOutcome {
        group_index,
        group_approved,
        workflow_approved,
    })
}

/// Move an in-progress workflow to `APPROVE` once every group is approved.
///
/// Returns whether the status changed. Run after any change that can
/// satisfy the last open group, decisions and structural edits alike.
pub fn settle_approval(workflow: &mut Workflow) -> bool {
    if workflow.is_in_progress() && workflow.is_fully_approved() {
        workflow.status = WorkflowStatus::Approve;
        true
    } else {
        false
    }
}
