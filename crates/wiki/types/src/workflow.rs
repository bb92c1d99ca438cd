//! Workflows: the ordered approver groups gating one page change
//!
//! A workflow owns its approver groups outright. Approval proceeds group by
//! group; a later group only becomes actionable once every earlier group is
//! approved.

use crate::{ApproverGroup, PageId, UserId, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall workflow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkflowStatus {
    #[default]
    Inprogress,
    Approve,
    Reject,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowStatus::Inprogress)
    }
}

/// Derived position of a group in the approval sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApproverGroupState {
    /// Waiting on an earlier group
    Pending,
    /// The first group not yet approved; its approvers may act
    Actionable,
    Approved,
}

/// Index of the last group whose approval rule is satisfied
pub fn latest_approved_group_index(groups: &[ApproverGroup]) -> Option<usize> {
    let mut latest = None;
    for (index, group) in groups.iter().enumerate() {
        if group.is_approved() {
            latest = Some(index);
        }
    }
    latest
}

/// An approval workflow attached to a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub creator: UserId,
    pub page_id: PageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: WorkflowStatus,
    pub approver_groups: Vec<ApproverGroup>,
    /// Bumped on every persisted mutation
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new in-progress workflow
    pub fn new(
        page_id: PageId,
        creator: UserId,
        name: Option<String>,
        comment: Option<String>,
        approver_groups: Vec<ApproverGroup>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::generate(),
            creator,
            page_id,
            name,
            comment,
            status: WorkflowStatus::Inprogress,
            approver_groups,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == WorkflowStatus::Inprogress
    }

    pub fn latest_approved_group_index(&self) -> Option<usize> {
        latest_approved_group_index(&self.approver_groups)
    }

    /// Gating state of every group, in sequence order
    pub fn group_states(&self) -> Vec<ApproverGroupState> {
        let mut blocked = false;
        self.approver_groups
            .iter()
            .map(|group| {
                if blocked {
                    ApproverGroupState::Pending
                } else if group.is_approved() {
                    ApproverGroupState::Approved
                } else {
                    blocked = true;
                    ApproverGroupState::Actionable
                }
            })
            .collect()
    }

    /// Index of the group whose approvers may currently act
    pub fn actionable_group_index(&self) -> Option<usize> {
        self.approver_groups.iter().position(|g| !g.is_approved())
    }

    /// Whether every group in the sequence is approved
    pub fn is_fully_approved(&self) -> bool {
        !self.approver_groups.is_empty() && self.actionable_group_index().is_none()
    }

    /// Every approver and delegate across all groups
    pub fn participant_ids(&self) -> impl Iterator<Item = &UserId> {
        self.approver_groups.iter().flat_map(|g| {
            g.approvers
                .iter()
                .flat_map(|a| std::iter::once(&a.user).chain(a.delegated_to.as_ref()))
        })
    }

    /// Whether `user` is the creator or takes part in any group
    pub fn involves(&self, user: &UserId) -> bool {
        &self.creator == user || self.participant_ids().any(|id| id == user)
    }

    /// Record a mutation: bump the revision and the modification time
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApprovalType, ApproverStatus};

    fn workflow(groups: Vec<ApproverGroup>) -> Workflow {
        Workflow::new(
            PageId::new("page-1"),
            UserId::new("creator"),
            Some("Review".to_string()),
            None,
            groups,
        )
    }

    fn approved(mut group: ApproverGroup) -> ApproverGroup {
        for approver in &mut group.approvers {
            approver.status = ApproverStatus::Approve;
        }
        group
    }

    #[test]
    fn test_new_workflow_in_progress() {
        let wf = workflow(vec![ApproverGroup::new(
            ApprovalType::And,
            [UserId::new("u1")],
        )]);
        assert!(wf.is_in_progress());
        assert_eq!(wf.revision, 0);
        assert_eq!(wf.latest_approved_group_index(), None);
        assert_eq!(wf.actionable_group_index(), Some(0));
    }

    #[test]
    fn test_group_states_follow_sequence() {
        let wf = workflow(vec![
            approved(ApproverGroup::new(ApprovalType::And, [UserId::new("u1")])),
            ApproverGroup::new(ApprovalType::Or, [UserId::new("u2")]),
            ApproverGroup::new(ApprovalType::And, [UserId::new("u3")]),
        ]);

        assert_eq!(
            wf.group_states(),
            vec![
                ApproverGroupState::Approved,
                ApproverGroupState::Actionable,
                ApproverGroupState::Pending,
            ]
        );
        assert_eq!(wf.latest_approved_group_index(), Some(0));
    }

    #[test]
    fn test_later_approved_group_stays_pending_behind_gate() {
        let wf = workflow(vec![
            ApproverGroup::new(ApprovalType::And, [UserId::new("u1")]),
            approved(ApproverGroup::new(ApprovalType::And, [UserId::new("u2")])),
        ]);

        assert_eq!(
            wf.group_states(),
            vec![ApproverGroupState::Actionable, ApproverGroupState::Pending]
        );
        assert_eq!(wf.latest_approved_group_index(), Some(1));
    }

    #[test]
    fn test_fully_approved() {
        let wf = workflow(vec![approved(ApproverGroup::new(
            ApprovalType::And,
            [UserId::new("u1")],
        ))]);
        assert!(wf.is_fully_approved());
        assert!(!workflow(Vec::new()).is_fully_approved());
    }

    #[test]
    fn test_involves_creator_approvers_and_delegates() {
        let mut wf = workflow(vec![ApproverGroup::new(
            ApprovalType::And,
            [UserId::new("u1")],
        )]);
        wf.approver_groups[0].approvers[0].delegate(UserId::new("d1"));

        assert!(wf.involves(&UserId::new("creator")));
        assert!(wf.involves(&UserId::new("u1")));
        assert!(wf.involves(&UserId::new("d1")));
        assert!(!wf.involves(&UserId::new("stranger")));
    }

    #[test]
    fn test_touch_bumps_revision() {
        let mut wf = workflow(Vec::new());
        let before = wf.updated_at;
        wf.touch();
        assert_eq!(wf.revision, 1);
        assert!(wf.updated_at >= before);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&WorkflowStatus::Inprogress).unwrap();
        assert_eq!(json, "\"INPROGRESS\"");
    }
}
