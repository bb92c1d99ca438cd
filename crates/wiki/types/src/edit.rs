//! Incremental edits to a workflow's approver groups
//!
//! Edits are accumulated as add/remove lists per group. The lists are always
//! rebuilt as new values; a user is never in both lists of one edit.

use crate::{ApprovalType, ApproverGroupId, UserId};
use serde::{Deserialize, Serialize};

/// A group to append to a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApproverGroupData {
    #[serde(default)]
    pub approval_type: ApprovalType,
    pub user_ids_to_add: Vec<UserId>,
}

impl CreateApproverGroupData {
    pub fn new(approval_type: ApprovalType, users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            approval_type,
            user_ids_to_add: users.into_iter().collect(),
        }
    }
}

/// Changes to one existing group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApproverGroupData {
    pub group_id: ApproverGroupId,
    pub approval_type: ApprovalType,
    #[serde(default)]
    pub user_ids_to_add: Vec<UserId>,
    #[serde(default)]
    pub user_ids_to_remove: Vec<UserId>,
}

impl UpdateApproverGroupData {
    pub fn new(group_id: ApproverGroupId, approval_type: ApprovalType) -> Self {
        Self {
            group_id,
            approval_type,
            user_ids_to_add: Vec::new(),
            user_ids_to_remove: Vec::new(),
        }
    }

    /// Build the edit turning a group's current approvers into `diff`'s target
    pub fn from_diff(group_id: ApproverGroupId, approval_type: ApprovalType, diff: ApproverDiff) -> Self {
        Self {
            group_id,
            approval_type,
            user_ids_to_add: diff.to_add,
            user_ids_to_remove: diff.to_remove,
        }
    }

    /// Mark `user` for addition, retracting a pending removal
    pub fn with_user_added(self, user: UserId) -> Self {
        Self {
            user_ids_to_remove: without(self.user_ids_to_remove, &user),
            user_ids_to_add: with(self.user_ids_to_add, user),
            ..self
        }
    }

    /// Mark `user` for removal, retracting a pending addition
    pub fn with_user_removed(self, user: UserId) -> Self {
        Self {
            user_ids_to_add: without(self.user_ids_to_add, &user),
            user_ids_to_remove: with(self.user_ids_to_remove, user),
            ..self
        }
    }

    /// Users listed for both addition and removal
    pub fn conflicting_users(&self) -> Vec<&UserId> {
        self.user_ids_to_add
            .iter()
            .filter(|u| self.user_ids_to_remove.contains(u))
            .collect()
    }
}

fn with(list: Vec<UserId>, user: UserId) -> Vec<UserId> {
    if list.contains(&user) {
        list
    } else {
        list.into_iter().chain(std::iter::once(user)).collect()
    }
}

fn without(list: Vec<UserId>, user: &UserId) -> Vec<UserId> {
    list.into_iter().filter(|u| u != user).collect()
}

/// Order-preserving set difference between two approver lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApproverDiff {
    pub to_add: Vec<UserId>,
    pub to_remove: Vec<UserId>,
}

impl ApproverDiff {
    pub fn between(old: &[UserId], new: &[UserId]) -> Self {
        Self {
            to_add: new.iter().filter(|u| !old.contains(u)).cloned().collect(),
            to_remove: old.iter().filter(|u| !new.contains(u)).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<UserId> {
        names.iter().map(|n| UserId::new(*n)).collect()
    }

    #[test]
    fn test_diff_between_lists() {
        let diff = ApproverDiff::between(&ids(&["a", "b", "c"]), &ids(&["b", "d", "c", "e"]));
        assert_eq!(diff.to_add, ids(&["d", "e"]));
        assert_eq!(diff.to_remove, ids(&["a"]));
    }

    #[test]
    fn test_diff_of_equal_lists_is_empty() {
        let diff = ApproverDiff::between(&ids(&["a", "b"]), &ids(&["b", "a"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_readd_retracts_removal() {
        let edit = UpdateApproverGroupData::new(ApproverGroupId::generate(), ApprovalType::And)
            .with_user_removed(UserId::new("a"))
            .with_user_added(UserId::new("b"))
            .with_user_added(UserId::new("a"));

        assert_eq!(edit.user_ids_to_add, ids(&["b", "a"]));
        assert!(edit.user_ids_to_remove.is_empty());
        assert!(edit.conflicting_users().is_empty());
    }

    #[test]
    fn test_removal_retracts_addition() {
        let edit = UpdateApproverGroupData::new(ApproverGroupId::generate(), ApprovalType::Or)
            .with_user_added(UserId::new("a"))
            .with_user_added(UserId::new("a"))
            .with_user_removed(UserId::new("a"));

        assert!(edit.user_ids_to_add.is_empty());
        assert_eq!(edit.user_ids_to_remove, ids(&["a"]));
    }

    #[test]
    fn test_conflicting_users_detected_in_raw_input() {
        let edit = UpdateApproverGroupData {
            group_id: ApproverGroupId::generate(),
            approval_type: ApprovalType::And,
            user_ids_to_add: ids(&["a", "b"]),
            user_ids_to_remove: ids(&["b"]),
        };
        assert_eq!(edit.conflicting_users(), vec![&UserId::new("b")]);
    }

    #[test]
    fn test_update_data_wire_format() {
        let json = serde_json::json!({
            "groupId": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "approvalType": "OR",
            "userIdsToAdd": ["a"]
        });
        let edit: UpdateApproverGroupData = serde_json::from_value(json).unwrap();
        assert_eq!(edit.approval_type, ApprovalType::Or);
        assert!(edit.user_ids_to_remove.is_empty());
    }
}
