//! Who may reject a workflow

use serde::{Deserialize, Serialize};
use wiki_workflow_types::{Operator, Workflow};

/// Rule deciding which operators may move a workflow to `REJECT`.
///
/// Administrators pass every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// A user holding an undecided slot in the actionable group
    #[default]
    ActionableApprover,
    /// The creator or anybody taking part in any group
    AnyParticipant,
    CreatorOrAdmin,
    AdminOnly,
}

impl RejectionPolicy {
    pub fn permits(&self, workflow: &Workflow, operator: &Operator) -> bool {
        if operator.admin {
            return true;
        }

        match self {
            RejectionPolicy::ActionableApprover => workflow
                .actionable_group_index()
                .map(|index| {
                    workflow.approver_groups[index]
                        .approvers
                        .iter()
                        .any(|a| a.acting_user() == Some(&operator.id))
                })
                .unwrap_or(false),
            RejectionPolicy::AnyParticipant => workflow.involves(&operator.id),
            RejectionPolicy::CreatorOrAdmin => workflow.creator == operator.id,
            RejectionPolicy::AdminOnly => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiki_workflow_types::{ApprovalType, ApproverGroup, PageId, UserId};

    fn workflow() -> Workflow {
        Workflow::new(
            PageId::new("page"),
            UserId::new("creator"),
            None,
            None,
            vec![
                ApproverGroup::new(ApprovalType::And, [UserId::new("a")]),
                ApproverGroup::new(ApprovalType::And, [UserId::new("b")]),
            ],
        )
    }

    #[test]
    fn test_actionable_approver_policy() {
        let wf = workflow();
        let policy = RejectionPolicy::ActionableApprover;
        assert!(policy.permits(&wf, &Operator::user("a")));
        assert!(!policy.permits(&wf, &Operator::user("b")));
        assert!(!policy.permits(&wf, &Operator::user("creator")));
        assert!(policy.permits(&wf, &Operator::admin("root")));
    }

    #[test]
    fn test_other_policies() {
        let wf = workflow();
        assert!(RejectionPolicy::AnyParticipant.permits(&wf, &Operator::user("b")));
        assert!(!RejectionPolicy::AnyParticipant.permits(&wf, &Operator::user("x")));
        assert!(RejectionPolicy::CreatorOrAdmin.permits(&wf, &Operator::user("creator")));
        assert!(!RejectionPolicy::CreatorOrAdmin.permits(&wf, &Operator::user("a")));
        assert!(!RejectionPolicy::AdminOnly.permits(&wf, &Operator::user("creator")));
        assert!(RejectionPolicy::AdminOnly.permits(&wf, &Operator::admin("root")));
    }

    #[test]
    fn test_policy_config_names() {
        let policy: RejectionPolicy = serde_json::from_str("\"creator_or_admin\"").unwrap();
        assert_eq!(policy, RejectionPolicy::CreatorOrAdmin);
    }
}
