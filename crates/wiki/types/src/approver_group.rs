//! Approver groups: one sequential stage of a workflow

use crate::{Approver, ApproverGroupId, ApproverStatus, UserId};
use serde::{Deserialize, Serialize};

/// Rule combining the decisions of a group's approvers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalType {
    /// Every approver must approve (or skip)
    #[default]
    And,
    /// A single approval suffices
    Or,
}

/// An ordered set of approvers sharing one approval rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverGroup {
    pub id: ApproverGroupId,
    pub approval_type: ApprovalType,
    pub approvers: Vec<Approver>,
}

impl ApproverGroup {
    /// Build a fresh group whose approvers have not decided yet
    pub fn new(approval_type: ApprovalType, users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id: ApproverGroupId::generate(),
            approval_type,
            approvers: users.into_iter().map(Approver::new).collect(),
        }
    }

    /// Whether the group's approval rule is satisfied.
    ///
    /// AND needs every approver to approve or skip. OR needs one approval,
    /// or every approver to have skipped.
    pub fn is_approved(&self) -> bool {
        match self.approval_type {
            ApprovalType::And => {
                !self.approvers.is_empty()
                    && self.approvers.iter().all(|a| a.status.satisfies_all())
            }
            ApprovalType::Or => {
                self.approvers
                    .iter()
                    .any(|a| a.status == ApproverStatus::Approve)
                    || (!self.approvers.is_empty()
                        && self.approvers.iter().all(|a| a.status == ApproverStatus::Skip))
            }
        }
    }

    /// Approver user ids in insertion order
    pub fn approver_ids(&self) -> impl Iterator<Item = &UserId> {
        self.approvers.iter().map(|a| &a.user)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.approvers.iter().any(|a| &a.user == user)
    }

    /// Whether `user` is an approver or a delegate of this group
    pub fn involves(&self, user: &UserId) -> bool {
        self.approvers.iter().any(|a| a.involves(user))
    }

    /// The slot `user` may currently decide
    pub fn acting_slot_mut(&mut self, user: &UserId) -> Option<&mut Approver> {
        self.approvers
            .iter_mut()
            .find(|a| a.acting_user() == Some(user))
    }

    /// Whether the group has the same shape as `other`: id, rule and approvers
    pub fn same_structure(&self, other: &ApproverGroup) -> bool {
        self.id == other.id
            && self.approval_type == other.approval_type
            && self.approver_ids().eq(other.approver_ids())
    }
}
