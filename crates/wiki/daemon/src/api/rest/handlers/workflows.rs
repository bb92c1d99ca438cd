//! Workflow handlers

use crate::api::rest::auth::AuthenticatedOperator;
use crate::api::rest::envelope::{ActivityList, ApiData, Deleted, WorkflowList, WorkflowView};
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use wiki_workflow_service::{ApproverGroupAction, NewWorkflow, WorkflowUpdate};
use wiki_workflow_types::{
    ApprovalType, ApproverStatus, CreateApproverGroupData, PageId, UpdateApproverGroupData,
    UserId, WorkflowId,
};

/// One approver group in a create request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverGroupRequest {
    #[serde(default)]
    pub approval_type: ApprovalType,
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

/// Create workflow request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowRequest {
    pub page_id: PageId,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub approver_groups: Vec<ApproverGroupRequest>,
}

/// Partial group for a structural edit; missing fields keep the current value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverGroupPatch {
    pub approval_type: Option<ApprovalType>,
    pub user_ids: Option<Vec<UserId>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Create,
    Update,
    Delete,
}

/// Edit the group at one offset
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditApproverGroupRequest {
    #[serde(default)]
    pub approver_group: ApproverGroupPatch,
    pub approver_group_offset: usize,
    pub action_type: ActionType,
}

/// Update name, comment and groups
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowRequest {
    pub name: Option<String>,
    pub comment: Option<String>,
    #[serde(default)]
    pub create_approver_group_data: Vec<CreateApproverGroupData>,
    #[serde(default)]
    pub update_approver_group_data: Vec<UpdateApproverGroupData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub approver_status: ApproverStatus,
    pub delegated_user_id: Option<UserId>,
}

/// Get a workflow
pub async fn get_workflow(
    State(state): State<AppState>,
    AuthenticatedOperator(_operator): AuthenticatedOperator,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state.workflows.get_workflow(&id).await?;
    Ok(Json(ApiData::new(workflow.into())))
}

/// List the workflows of a page
pub async fn list_workflows(
    State(state): State<AppState>,
    AuthenticatedOperator(_operator): AuthenticatedOperator,
    Path(page_id): Path<String>,
) -> ApiResult<Json<ApiData<WorkflowList>>> {
    let workflows = state
        .workflows
        .list_workflows(&PageId::new(page_id))
        .await?
        .into_iter()
        .map(WorkflowView::from)
        .collect();

    Ok(Json(ApiData::new(WorkflowList { workflows })))
}

/// Create a workflow; the operator becomes its creator
pub async fn create_workflow(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Json(request): Json<CreateWorkflowRequest>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let approver_groups = request
        .approver_groups
        .into_iter()
        .map(|g| CreateApproverGroupData::new(g.approval_type, g.user_ids))
        .collect();

    let workflow = state
        .workflows
        .create_workflow(NewWorkflow {
            page_id: request.page_id,
            creator: operator.id,
            name: request.name,
            comment: request.comment,
            approver_groups,
        })
        .await?;

    Ok(Json(ApiData::new(workflow.into())))
}

/// Create, update or delete the group at an offset
pub async fn edit_approver_group(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Path(id): Path<String>,
    Json(request): Json<EditApproverGroupRequest>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let id = parse_workflow_id(&id)?;
    let offset = request.approver_group_offset;
    let patch = request.approver_group;

    let action = match request.action_type {
        ActionType::Create => ApproverGroupAction::Create {
            approval_type: patch.approval_type.unwrap_or_default(),
            user_ids: patch.user_ids.unwrap_or_default(),
        },
        ActionType::Update => ApproverGroupAction::Update {
            approval_type: patch.approval_type,
            user_ids: patch.user_ids,
        },
        ActionType::Delete => ApproverGroupAction::Delete,
    };

    let workflow = state
        .workflows
        .edit_approver_group(&id, &operator, offset, action)
        .await?;

    Ok(Json(ApiData::new(workflow.into())))
}

/// Update name, comment and approver groups
pub async fn update_workflow(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Path(id): Path<String>,
    Json(request): Json<UpdateWorkflowRequest>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state
        .workflows
        .update_workflow(
            &id,
            &operator,
            WorkflowUpdate {
                name: request.name,
                comment: request.comment,
                create_approver_groups: request.create_approver_group_data,
                update_approver_groups: request.update_approver_group_data,
            },
        )
        .await?;

    Ok(Json(ApiData::new(workflow.into())))
}

/// Record the operator's approval decision
pub async fn update_approver_status(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state
        .workflows
        .update_approver_status(
            &id,
            &operator,
            request.approver_status,
            request.delegated_user_id,
        )
        .await?;

    Ok(Json(ApiData::new(workflow.into())))
}

/// Reject a workflow
pub async fn reject_workflow(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiData<WorkflowView>>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state.workflows.reject_workflow(&id, &operator).await?;
    Ok(Json(ApiData::new(workflow.into())))
}

/// Delete a workflow; creator or administrator only
pub async fn delete_workflow(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiData<Deleted>>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state.workflows.get_workflow(&id).await?;
    state.workflows.validate_deletable_user(&workflow, &operator)?;
    state.workflows.delete_workflow(&id).await?;

    tracing::info!(workflow_id = %id, operator = %operator.id, "Workflow deleted via API");

    Ok(Json(ApiData::new(Deleted { deleted: true })))
}

/// Activity log of a workflow
pub async fn list_activities(
    State(state): State<AppState>,
    AuthenticatedOperator(_operator): AuthenticatedOperator,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiData<ActivityList>>> {
    let id = parse_workflow_id(&id)?;
    let activities = state.workflows.list_activities(&id).await?;
    Ok(Json(ApiData::new(ActivityList { activities })))
}

fn parse_workflow_id(id: &str) -> ApiResult<WorkflowId> {
    id.parse()
        .map_err(|e: wiki_workflow_types::InvalidIdError| ApiError::BadRequest(e.to_string()))
}
