//! Approval workflow domain types for the wiki
//!
//! A page change can be gated by a [`Workflow`]: an ordered sequence of
//! [`ApproverGroup`]s, each combining the decisions of its [`Approver`]s with
//! an AND/OR rule. Groups are approved strictly in sequence.
//!
//! This crate holds the data shapes and the derived state only. Mutation and
//! invariant enforcement live in `wiki-workflow-service`.

#![deny(unsafe_code)]

pub mod approver;
pub mod approver_group;
pub mod edit;
pub mod ids;
pub mod operator;
pub mod workflow;

pub use approver::{Approver, ApproverStatus};
pub use approver_group::{ApprovalType, ApproverGroup};
pub use edit::{ApproverDiff, CreateApproverGroupData, UpdateApproverGroupData};
pub use ids::{ApproverGroupId, InvalidIdError, PageId, UserId, WorkflowId};
pub use operator::Operator;
pub use workflow::{latest_approved_group_index, ApproverGroupState, Workflow, WorkflowStatus};
