//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Workflows
        .route("/workflow", post(handlers::create_workflow))
        .route("/workflow/events", get(handlers::stream_events))
        .route("/workflow/list/:page_id", get(handlers::list_workflows))
        .route(
            "/workflow/:workflow_id",
            get(handlers::get_workflow)
                .put(handlers::edit_approver_group)
                .patch(handlers::update_workflow)
                .delete(handlers::delete_workflow),
        )
        .route(
            "/workflow/:workflow_id/status",
            put(handlers::update_approver_status),
        )
        .route(
            "/workflow/:workflow_id/reject",
            post(handlers::reject_workflow),
        )
        .route(
            "/workflow/:workflow_id/activities",
            get(handlers::list_activities),
        );

    Router::new()
        .nest("/_api/v3", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::auth::{USER_ADMIN_HEADER, USER_ID_HEADER};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::broadcast;
    use tower::ServiceExt;
    use wiki_workflow_service::{InMemoryStorage, WorkflowService};

    fn app() -> Router {
        let (event_tx, _) = broadcast::channel(16);
        let service = WorkflowService::new(Arc::new(InMemoryStorage::new()), event_tx);
        create_router(AppState::new(Arc::new(service)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<(&str, bool)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some((id, admin)) = user {
            request = request
                .header(USER_ID_HEADER, id)
                .header(USER_ADMIN_HEADER, admin.to_string());
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/_api/v3/workflow",
            Some(("creator", false)),
            Some(json!({
                "pageId": "page-1",
                "name": "Review",
                "approverGroups": [
                    { "approvalType": "AND", "userIds": ["a"] },
                    { "approvalType": "OR", "userIds": ["b", "c"] }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_needs_no_operator() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/_api/v3/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_operator_is_unauthorized() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/_api/v3/workflow/list/page-1", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_create_and_get_workflow() {
        let app = app();
        let id = create(&app).await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/_api/v3/workflow/{id}"),
            Some(("anyone", false)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let groups = &body["data"]["approverGroups"];
        assert_eq!(groups[0]["state"], "ACTIONABLE");
        assert_eq!(groups[1]["state"], "PENDING");
        assert_eq!(groups[0]["approvers"][0]["status"], "NONE");
        assert_eq!(body["data"]["creator"], "creator");

        let (status, body) = send(
            &app,
            Method::GET,
            "/_api/v3/workflow/list/page-1",
            Some(("anyone", false)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["workflows"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_workflow_for_page_conflicts() {
        let app = app();
        create(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/_api/v3/workflow",
            Some(("creator", false)),
            Some(json!({
                "pageId": "page-1",
                "approverGroups": [{ "approvalType": "AND", "userIds": ["a"] }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_creator_as_approver_is_unprocessable() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/_api/v3/workflow",
            Some(("creator", false)),
            Some(json!({
                "pageId": "page-1",
                "approverGroups": [{ "approvalType": "AND", "userIds": ["creator"] }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::GET,
            "/_api/v3/workflow/not-a-uuid",
            Some(("anyone", false)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_approval_flow_over_http() {
        let app = app();
        let id = create(&app).await;
        let status_uri = format!("/_api/v3/workflow/{id}/status");

        let (status, _) = send(
            &app,
            Method::PUT,
            &status_uri,
            Some(("b", false)),
            Some(json!({ "approverStatus": "APPROVE" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::PUT,
            &status_uri,
            Some(("a", false)),
            Some(json!({ "approverStatus": "APPROVE" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::PUT,
            &status_uri,
            Some(("c", false)),
            Some(json!({ "approverStatus": "APPROVE" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "APPROVE");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/_api/v3/workflow/{id}"),
            Some(("root", true)),
            Some(json!({ "name": "late edit" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_STATE");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/_api/v3/workflow/{id}/activities"),
            Some(("anyone", false)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["activities"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_edit_group_at_offset() {
        let app = app();
        let id = create(&app).await;
        let uri = format!("/_api/v3/workflow/{id}");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(("a", false)),
            Some(json!({
                "approverGroup": { "userIds": ["d"] },
                "approverGroupOffset": 1,
                "actionType": "UPDATE"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let group = &body["data"]["approverGroups"][1];
        assert_eq!(group["approvalType"], "OR");
        assert_eq!(group["approvers"].as_array().unwrap().len(), 1);
        assert_eq!(group["approvers"][0]["user"], "d");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(("stranger", false)),
            Some(json!({ "approverGroupOffset": 1, "actionType": "DELETE" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_delete_requires_creator_or_admin() {
        let app = app();
        let id = create(&app).await;
        let uri = format!("/_api/v3/workflow/{id}");

        let (status, _) = send(&app, Method::DELETE, &uri, Some(("a", false)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(("creator", false)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);

        let (status, _) = send(&app, Method::GET, &uri, Some(("creator", false)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reject_over_http() {
        let app = app();
        let id = create(&app).await;
        let uri = format!("/_api/v3/workflow/{id}/reject");

        let (status, _) = send(&app, Method::POST, &uri, Some(("c", false)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::POST, &uri, Some(("a", false)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "REJECT");
    }
}
