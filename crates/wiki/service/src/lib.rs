//! Approval workflow service for the wiki
//!
//! [`WorkflowService`] is the only component allowed to mutate a
//! [`Workflow`](wiki_workflow_types::Workflow). It is composed of:
//!
//! - [`approver_group`]: group mutation and whole-sequence validation
//! - [`gating`]: sequential approval: who may decide, and when a workflow is approved
//! - [`policy`]: the configurable rule for rejecting a workflow
//! - [`storage`]: persistence traits and the in-memory backend
//! - [`events`]: change notifications on a caller-provided broadcast channel

#![deny(unsafe_code)]

pub mod activity;
pub mod approver_group;
pub mod error;
pub mod events;
pub mod gating;
pub mod policy;
pub mod service;
pub mod storage;

pub use activity::{ActivityAction, WorkflowActivity};
pub use error::{StorageError, ValidationError, WorkflowError, WorkflowResult};
pub use events::{WorkflowEvent, WorkflowEventEnvelope};
pub use gating::{ApproverDecision, DecisionOutcome};
pub use policy::RejectionPolicy;
pub use service::{ApproverGroupAction, NewWorkflow, WorkflowService, WorkflowUpdate};
pub use storage::{ActivityStorage, InMemoryStorage, Storage, WorkflowStorage};
