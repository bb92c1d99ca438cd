//! The workflow service: sole mutation authority over workflows
//!
//! Every mutation loads the aggregate, applies the change to an owned copy,
//! validates the result and writes it back in one compare-and-swap on the
//! workflow revision. A rejected mutation writes nothing.

use crate::activity::{ActivityAction, WorkflowActivity};
use crate::approver_group::{
    approver_group_at, build_approver_groups, create_approver_groups, insert_approver_group,
    remove_approver_group, update_approver_groups, validate_approver_groups, GroupValidation,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::{WorkflowEvent, WorkflowEventEnvelope};
use crate::gating::{apply_decision, settle_approval, ApproverDecision};
use crate::policy::RejectionPolicy;
use crate::storage::{ActivityStorage, Storage, WorkflowStorage};
use std::sync::Arc;
use tokio::sync::broadcast;
use wiki_workflow_types::{
    ApprovalType, ApproverDiff, ApproverGroup, ApproverStatus, CreateApproverGroupData, Operator,
    PageId, UpdateApproverGroupData, UserId, Workflow, WorkflowId, WorkflowStatus,
};

/// Input for [`WorkflowService::create_workflow`]
#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub page_id: PageId,
    pub creator: UserId,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub approver_groups: Vec<CreateApproverGroupData>,
}

/// Input for [`WorkflowService::update_workflow`].
///
/// `name` and `comment` are always written; `None` clears them.
#[derive(Debug, Clone, Default)]
pub struct WorkflowUpdate {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub create_approver_groups: Vec<CreateApproverGroupData>,
    pub update_approver_groups: Vec<UpdateApproverGroupData>,
}

/// A structural edit of the group at one position of the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverGroupAction {
    /// Insert a new group at the offset
    Create {
        approval_type: ApprovalType,
        user_ids: Vec<UserId>,
    },
    /// Replace the rule and approver set of the group at the offset;
    /// `None` keeps the group's current value
    Update {
        approval_type: Option<ApprovalType>,
        user_ids: Option<Vec<UserId>>,
    },
    /// Remove the group at the offset
    Delete,
}

/// Orchestrates creation, mutation and status transitions of workflows
pub struct WorkflowService {
    storage: Arc<dyn Storage>,
    events: broadcast::Sender<WorkflowEventEnvelope>,
    rejection_policy: RejectionPolicy,
}

impl WorkflowService {
    /// Create a service publishing its events on `events`
    pub fn new(storage: Arc<dyn Storage>, events: broadcast::Sender<WorkflowEventEnvelope>) -> Self {
        Self {
            storage,
            events,
            rejection_policy: RejectionPolicy::default(),
        }
    }

    pub fn with_rejection_policy(mut self, policy: RejectionPolicy) -> Self {
        self.rejection_policy = policy;
        self
    }

    pub fn rejection_policy(&self) -> RejectionPolicy {
        self.rejection_policy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEventEnvelope> {
        self.events.subscribe()
    }

    /// Start a new in-progress workflow for a page
    pub async fn create_workflow(&self, new: NewWorkflow) -> WorkflowResult<Workflow> {
        if self
            .storage
            .has_in_progress_workflow_for_page(&new.page_id)
            .await?
        {
            return Err(WorkflowError::Conflict(format!(
                "An in-progress workflow already exists for page {}",
                new.page_id
            )));
        }

        let groups = build_approver_groups(&new.approver_groups);
        validate_approver_groups(GroupValidation::Creation, &new.creator, &groups)?;

        let workflow = Workflow::new(new.page_id, new.creator, new.name, new.comment, groups);
        self.storage.insert_workflow(workflow.clone()).await?;
        self.record(workflow.id, &workflow.creator, ActivityAction::Created)
            .await?;

        tracing::info!(
            workflow_id = %workflow.id,
            page_id = %workflow.page_id,
            creator = %workflow.creator,
            groups = workflow.approver_groups.len(),
            "Created workflow"
        );

        self.publish(WorkflowEvent::Created {
            workflow_id: workflow.id,
            page_id: workflow.page_id.clone(),
            creator: workflow.creator.clone(),
        });

        Ok(workflow)
    }

    /// Get a workflow by id
    pub async fn get_workflow(&self, id: &WorkflowId) -> WorkflowResult<Workflow> {
        self.storage
            .get_workflow(id)
            .await?
            .ok_or(WorkflowError::NotFound(*id))
    }

    /// All workflows of a page, newest first
    pub async fn list_workflows(&self, page_id: &PageId) -> WorkflowResult<Vec<Workflow>> {
        Ok(self.storage.list_workflows_for_page(page_id).await?)
    }

    /// Edit name, comment and approver groups of an in-progress workflow.
    ///
    /// New groups are appended first, then existing groups are edited, then
    /// the whole sequence is validated against the stored one.
    pub async fn update_workflow(
        &self,
        id: &WorkflowId,
        operator: &Operator,
        update: WorkflowUpdate,
    ) -> WorkflowResult<Workflow> {
        let mut workflow = self.load_editable(id, operator).await?;
        let original = workflow.approver_groups.clone();
        let expected_revision = workflow.revision;

        if !update.create_approver_groups.is_empty() {
            create_approver_groups(&mut workflow, &update.create_approver_groups);
        }

        if !update.update_approver_groups.is_empty() {
            update_approver_groups(&mut workflow, &update.update_approver_groups)?;
        }

        validate_approver_groups(
            GroupValidation::Update {
                original: &original,
            },
            &workflow.creator,
            &workflow.approver_groups,
        )?;

        workflow.name = update.name;
        workflow.comment = update.comment;
        let approved = settle_approval(&mut workflow);

        let workflow = self.persist(workflow, expected_revision).await?;
        self.record(workflow.id, &operator.id, ActivityAction::Updated)
            .await?;

        tracing::info!(workflow_id = %workflow.id, operator = %operator.id, "Updated workflow");

        self.publish(WorkflowEvent::Updated {
            workflow_id: workflow.id,
            revision: workflow.revision,
        });

        if approved {
            self.announce_approval(&workflow, &operator.id).await?;
        }

        Ok(workflow)
    }

    /// Create, replace or delete the group at `offset`
    pub async fn edit_approver_group(
        &self,
        id: &WorkflowId,
        operator: &Operator,
        offset: usize,
        action: ApproverGroupAction,
    ) -> WorkflowResult<Workflow> {
        let mut workflow = self.load_editable(id, operator).await?;
        let original = workflow.approver_groups.clone();
        let expected_revision = workflow.revision;

        match action {
            ApproverGroupAction::Create {
                approval_type,
                user_ids,
            } => {
                insert_approver_group(
                    &mut workflow,
                    offset,
                    ApproverGroup::new(approval_type, user_ids),
                )?;
            }
            ApproverGroupAction::Update {
                approval_type,
                user_ids,
            } => {
                let group = approver_group_at(&workflow, offset)?;
                let current: Vec<UserId> = group.approver_ids().cloned().collect();
                let target = user_ids.unwrap_or_else(|| current.clone());
                let edit = UpdateApproverGroupData::from_diff(
                    group.id,
                    approval_type.unwrap_or(group.approval_type),
                    ApproverDiff::between(&current, &target),
                );
                update_approver_groups(&mut workflow, &[edit])?;
            }
            ApproverGroupAction::Delete => {
                remove_approver_group(&mut workflow, offset)?;
            }
        }

        validate_approver_groups(
            GroupValidation::Update {
                original: &original,
            },
            &workflow.creator,
            &workflow.approver_groups,
        )?;
        let approved = settle_approval(&mut workflow);

        let workflow = self.persist(workflow, expected_revision).await?;
        self.record(workflow.id, &operator.id, ActivityAction::ApproverGroupEdited)
            .await?;

        tracing::info!(
            workflow_id = %workflow.id,
            operator = %operator.id,
            offset,
            "Edited approver group"
        );

        self.publish(WorkflowEvent::Updated {
            workflow_id: workflow.id,
            revision: workflow.revision,
        });

        if approved {
            self.announce_approval(&workflow, &operator.id).await?;
        }

        Ok(workflow)
    }

    /// Record the operator's decision in the actionable group
    pub async fn update_approver_status(
        &self,
        id: &WorkflowId,
        operator: &Operator,
        status: ApproverStatus,
        delegated_user_id: Option<UserId>,
    ) -> WorkflowResult<Workflow> {
        let mut workflow = self.get_workflow(id).await?;
        ensure_in_progress(&workflow)?;

        let decision = ApproverDecision::from_request(status, delegated_user_id)?;
        let expected_revision = workflow.revision;
        let outcome = apply_decision(&mut workflow, &operator.id, decision)?;

        let workflow = self.persist(workflow, expected_revision).await?;
        self.record(workflow.id, &operator.id, ActivityAction::ApproverStatusChanged)
            .await?;

        tracing::info!(
            workflow_id = %workflow.id,
            operator = %operator.id,
            status = ?status,
            group = outcome.group_index,
            group_approved = outcome.group_approved,
            "Updated approver status"
        );

        self.publish(WorkflowEvent::ApproverStatusChanged {
            workflow_id: workflow.id,
            user: operator.id.clone(),
            status,
        });

        if outcome.workflow_approved {
            self.announce_approval(&workflow, &operator.id).await?;
        }

        Ok(workflow)
    }

    /// Move an in-progress workflow to `REJECT` under the rejection policy
    pub async fn reject_workflow(&self, id: &WorkflowId, operator: &Operator) -> WorkflowResult<Workflow> {
        let mut workflow = self.get_workflow(id).await?;
        ensure_in_progress(&workflow)?;

        if !self.rejection_policy.permits(&workflow, operator) {
            tracing::debug!(
                workflow_id = %workflow.id,
                operator = %operator.id,
                policy = ?self.rejection_policy,
                "Rejection denied"
            );
            return Err(WorkflowError::Authorization(format!(
                "{} may not reject this workflow",
                operator.id
            )));
        }

        let expected_revision = workflow.revision;
        workflow.status = WorkflowStatus::Reject;

        let workflow = self.persist(workflow, expected_revision).await?;
        self.record(workflow.id, &operator.id, ActivityAction::Rejected)
            .await?;

        tracing::info!(workflow_id = %workflow.id, operator = %operator.id, "Workflow rejected");

        self.publish(WorkflowEvent::Rejected {
            workflow_id: workflow.id,
            by: operator.id.clone(),
        });

        Ok(workflow)
    }

    /// Delete a workflow and its activity log, whatever its status
    pub async fn delete_workflow(&self, id: &WorkflowId) -> WorkflowResult<()> {
        let workflow = self.get_workflow(id).await?;

        self.storage.delete_workflow(id).await?;
        let activities = self.storage.delete_activities_for_workflow(id).await?;

        tracing::info!(workflow_id = %id, activities, "Deleted workflow");

        self.publish(WorkflowEvent::Deleted {
            workflow_id: workflow.id,
            page_id: workflow.page_id,
        });

        Ok(())
    }

    /// Delete every workflow of a page; used when the page itself goes away
    pub async fn delete_workflows_for_page(&self, page_id: &PageId) -> WorkflowResult<usize> {
        let ids = self.storage.delete_workflows_for_page(page_id).await?;

        for id in &ids {
            self.storage.delete_activities_for_workflow(id).await?;
            self.publish(WorkflowEvent::Deleted {
                workflow_id: *id,
                page_id: page_id.clone(),
            });
        }

        if !ids.is_empty() {
            tracing::info!(page_id = %page_id, count = ids.len(), "Deleted workflows of page");
        }

        Ok(ids.len())
    }

    /// The activity log of a workflow
    pub async fn list_activities(&self, id: &WorkflowId) -> WorkflowResult<Vec<WorkflowActivity>> {
        self.get_workflow(id).await?;
        Ok(self.storage.list_activities(id).await?)
    }

    /// Check that `operator` may operate on `workflow`.
    ///
    /// Administrators always may; otherwise the operator must be the creator
    /// or take part in one of the approver groups. Call this before updating
    /// or deleting a workflow on behalf of a user. Deletions that happen as a
    /// side effect, such as when a page is deleted, skip it.
    pub fn validate_operatable_user(&self, workflow: &Workflow, operator: &Operator) -> WorkflowResult<()> {
        if operator.admin || workflow.involves(&operator.id) {
            return Ok(());
        }

        Err(WorkflowError::Authorization(
            "Only the workflow creator, workflow approver or administrator can operate it".into(),
        ))
    }

    /// Check that `operator` may delete `workflow`: its creator or an administrator
    pub fn validate_deletable_user(&self, workflow: &Workflow, operator: &Operator) -> WorkflowResult<()> {
        if operator.admin || workflow.creator == operator.id {
            return Ok(());
        }

        Err(WorkflowError::Authorization(
            "Only the workflow creator or administrator can delete it".into(),
        ))
    }

    async fn load_editable(&self, id: &WorkflowId, operator: &Operator) -> WorkflowResult<Workflow> {
        let workflow = self.get_workflow(id).await?;

        if !workflow.is_in_progress() {
            return Err(WorkflowError::State(
                "Cannot edit a workflow that is not in progress".into(),
            ));
        }

        self.validate_operatable_user(&workflow, operator)?;
        Ok(workflow)
    }

    async fn persist(&self, mut workflow: Workflow, expected_revision: u64) -> WorkflowResult<Workflow> {
        workflow.touch();
        self.storage
            .update_workflow(workflow.clone(), expected_revision)
            .await?;
        Ok(workflow)
    }

    async fn record(&self, workflow_id: WorkflowId, actor: &UserId, action: ActivityAction) -> WorkflowResult<()> {
        self.storage
            .store_activity(WorkflowActivity::new(workflow_id, actor.clone(), action))
            .await?;
        Ok(())
    }

    async fn announce_approval(&self, workflow: &Workflow, actor: &UserId) -> WorkflowResult<()> {
        self.record(workflow.id, actor, ActivityAction::Approved)
            .await?;
        tracing::info!(workflow_id = %workflow.id, "Workflow approved");
        self.publish(WorkflowEvent::Approved {
            workflow_id: workflow.id,
        });
        Ok(())
    }

    fn publish(&self, event: WorkflowEvent) {
        if self.events.send(WorkflowEventEnvelope::new(event)).is_err() {
            tracing::trace!("No workflow event subscribers");
        }
    }
}

fn ensure_in_progress(workflow: &Workflow) -> WorkflowResult<()> {
    if workflow.is_in_progress() {
        Ok(())
    } else {
        Err(WorkflowError::State(format!(
            "workflow {} is not in progress",
            workflow.id
        )))
    }
}
