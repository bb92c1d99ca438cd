//! Approver-group mutation and validation
//!
//! Mutations here only reshape the group list of a workflow held in memory.
//! Callers run [`validate_approver_groups`] over the result before anything
//! is persisted.

use crate::error::ValidationError;
use std::collections::HashSet;
use wiki_workflow_types::{
    latest_approved_group_index, Approver, ApproverGroup, CreateApproverGroupData,
    UpdateApproverGroupData, UserId, Workflow,
};

/// Which invariants [`validate_approver_groups`] enforces
#[derive(Debug, Clone, Copy)]
pub enum GroupValidation<'a> {
    /// Groups of a workflow being created
    Creation,
    /// Groups of an existing workflow, checked against its stored groups
    Update { original: &'a [ApproverGroup] },
}

/// Build fresh groups from creation data, every approver undecided
pub fn build_approver_groups(data: &[CreateApproverGroupData]) -> Vec<ApproverGroup> {
    data.iter()
        .map(|d| ApproverGroup::new(d.approval_type, d.user_ids_to_add.iter().cloned()))
        .collect()
}

/// Append new groups to the workflow
pub fn create_approver_groups(workflow: &mut Workflow, data: &[CreateApproverGroupData]) {
    workflow
        .approver_groups
        .extend(build_approver_groups(data));
}

/// Apply add/remove edits to existing groups, keyed by group id
pub fn update_approver_groups(
    workflow: &mut Workflow,
    data: &[UpdateApproverGroupData],
) -> Result<(), ValidationError> {
    for edit in data {
        if let Some(user) = edit.conflicting_users().first() {
            return Err(ValidationError::ConflictingApproverEdit {
                group_id: edit.group_id,
                user: (*user).clone(),
            });
        }

        let group = workflow
            .approver_groups
            .iter_mut()
            .find(|g| g.id == edit.group_id)
            .ok_or(ValidationError::UnknownApproverGroup(edit.group_id))?;

        group.approval_type = edit.approval_type;
        group.approvers = apply_edit(std::mem::take(&mut group.approvers), edit);
    }

    Ok(())
}

fn apply_edit(approvers: Vec<Approver>, edit: &UpdateApproverGroupData) -> Vec<Approver> {
    let kept: Vec<Approver> = approvers
        .into_iter()
        .filter(|a| !edit.user_ids_to_remove.contains(&a.user))
        .collect();

    let added: Vec<Approver> = edit
        .user_ids_to_add
        .iter()
        .filter(|u| !kept.iter().any(|a| &a.user == *u))
        .cloned()
        .map(Approver::new)
        .collect();

    kept.into_iter().chain(added).collect()
}

/// Insert a group at `offset`, shifting later groups back
pub fn insert_approver_group(
    workflow: &mut Workflow,
    offset: usize,
    group: ApproverGroup,
) -> Result<(), ValidationError> {
    let len = workflow.approver_groups.len();
    if offset > len {
        return Err(ValidationError::OffsetOutOfRange { offset, len });
    }
    workflow.approver_groups.insert(offset, group);
    Ok(())
}

/// Remove the group at `offset`
pub fn remove_approver_group(
    workflow: &mut Workflow,
    offset: usize,
) -> Result<ApproverGroup, ValidationError> {
    let len = workflow.approver_groups.len();
    if offset >= len {
        return Err(ValidationError::OffsetOutOfRange { offset, len });
    }
    Ok(workflow.approver_groups.remove(offset))
}

/// The group at `offset`
pub fn approver_group_at(workflow: &Workflow, offset: usize) -> Result<&ApproverGroup, ValidationError> {
    workflow
        .approver_groups
        .get(offset)
        .ok_or(ValidationError::OffsetOutOfRange {
            offset,
            len: workflow.approver_groups.len(),
        })
}

/// Check the structural invariants of a full group list.
///
/// Rules are checked in a fixed order and the first violation is returned:
/// the list is non-empty, every group has an approver, the creator is not an
/// approver or delegate, no user holds two slots of a group as approver or
/// delegate, and (on update) groups up to the latest approved one are
/// unchanged.
pub fn validate_approver_groups(
    mode: GroupValidation<'_>,
    creator: &UserId,
    groups: &[ApproverGroup],
) -> Result<(), ValidationError> {
    if groups.is_empty() {
        return Err(ValidationError::NoApproverGroups);
    }

    if let Some(index) = groups.iter().position(|g| g.approvers.is_empty()) {
        return Err(ValidationError::EmptyApproverGroup { index });
    }

    for (index, group) in groups.iter().enumerate() {
        if group.involves(creator) {
            return Err(ValidationError::CreatorAsApprover {
                index,
                user: creator.clone(),
            });
        }
    }

    for (index, group) in groups.iter().enumerate() {
        let mut seen = HashSet::new();
        let mut holders = group
            .approvers
            .iter()
            .flat_map(|a| std::iter::once(&a.user).chain(a.delegated_to.as_ref()));
        if let Some(user) = holders.find(|u| !seen.insert(*u)) {
            return Err(ValidationError::DuplicateApprover {
                index,
                user: user.clone(),
            });
        }
    }

    if let GroupValidation::Update { original } = mode {
        if let Some(latest) = latest_approved_group_index(original) {
            for (index, before) in original.iter().enumerate().take(latest + 1) {
                let unchanged = groups
                    .get(index)
                    .is_some_and(|after| after.same_structure(before));
                if !unchanged {
                    return Err(ValidationError::ApprovedGroupAltered { index });
                }
            }
        }
    }

    Ok(())
}
