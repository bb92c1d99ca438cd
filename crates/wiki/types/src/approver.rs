//! A single user's participation in an approver group

use crate::UserId;
use serde::{Deserialize, Serialize};

/// Decision state of one approver slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApproverStatus {
    /// No decision yet
    #[default]
    None,
    Approve,
    /// Decision handed to another user, who now acts for this slot
    Delegate,
    Skip,
}

impl ApproverStatus {
    /// Whether the slot still waits for someone to act on it
    pub fn is_pending(&self) -> bool {
        matches!(self, ApproverStatus::None | ApproverStatus::Delegate)
    }

    /// Whether the slot counts towards an AND group's approval
    pub fn satisfies_all(&self) -> bool {
        matches!(self, ApproverStatus::Approve | ApproverStatus::Skip)
    }
}

/// An approver slot within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approver {
    pub user: UserId,
    #[serde(default)]
    pub status: ApproverStatus,
    /// Set when the slot was delegated; kept after the delegate decides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_to: Option<UserId>,
}

impl Approver {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            status: ApproverStatus::None,
            delegated_to: None,
        }
    }

    /// The user allowed to decide this slot right now, if any
    pub fn acting_user(&self) -> Option<&UserId> {
        match self.status {
            ApproverStatus::None => Some(&self.user),
            ApproverStatus::Delegate => self.delegated_to.as_ref(),
            ApproverStatus::Approve | ApproverStatus::Skip => None,
        }
    }

    /// Whether `user` holds this slot, either directly or as the delegate
    pub fn involves(&self, user: &UserId) -> bool {
        &self.user == user || self.delegated_to.as_ref() == Some(user)
    }

    pub fn approve(&mut self) {
        self.status = ApproverStatus::Approve;
    }

    pub fn skip(&mut self) {
        self.status = ApproverStatus::Skip;
    }

    pub fn delegate(&mut self, to: UserId) {
        self.status = ApproverStatus::Delegate;
        self.delegated_to = Some(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_approver_is_pending() {
        let approver = Approver::new(UserId::new("alice"));
        assert_eq!(approver.status, ApproverStatus::None);
        assert!(approver.status.is_pending());
        assert_eq!(approver.acting_user(), Some(&UserId::new("alice")));
    }

    #[test]
    fn test_delegation_moves_acting_user() {
        let mut approver = Approver::new(UserId::new("alice"));
        approver.delegate(UserId::new("bob"));

        assert_eq!(approver.acting_user(), Some(&UserId::new("bob")));
        assert!(approver.involves(&UserId::new("alice")));
        assert!(approver.involves(&UserId::new("bob")));

        approver.approve();
        assert_eq!(approver.acting_user(), None);
        assert_eq!(approver.delegated_to, Some(UserId::new("bob")));
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ApproverStatus::Delegate).unwrap();
        assert_eq!(json, "\"DELEGATE\"");

        let approver: Approver = serde_json::from_str(r#"{"user":"carol"}"#).unwrap();
        assert_eq!(approver.status, ApproverStatus::None);
        assert!(approver.delegated_to.is_none());
    }
}
