//! Workflow change notifications
//!
//! Events go out on a broadcast channel owned by the [`WorkflowService`]
//! instance that produced them.
//!
//! [`WorkflowService`]: crate::WorkflowService

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wiki_workflow_types::{ApproverStatus, PageId, UserId, WorkflowId};

/// Something that happened to a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WorkflowEvent {
    Created {
        workflow_id: WorkflowId,
        page_id: PageId,
        creator: UserId,
    },
    Updated {
        workflow_id: WorkflowId,
        revision: u64,
    },
    ApproverStatusChanged {
        workflow_id: WorkflowId,
        user: UserId,
        status: ApproverStatus,
    },
    Approved {
        workflow_id: WorkflowId,
    },
    Rejected {
        workflow_id: WorkflowId,
        by: UserId,
    },
    Deleted {
        workflow_id: WorkflowId,
        page_id: PageId,
    },
}

/// Event with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEventEnvelope {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WorkflowEvent,
}

impl WorkflowEventEnvelope {
    pub fn new(event: WorkflowEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_event() {
        let envelope = WorkflowEventEnvelope::new(WorkflowEvent::Approved {
            workflow_id: WorkflowId::generate(),
        });
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "approved");
        assert!(value.get("workflowId").is_some());
        assert!(value.get("at").is_some());
    }

    #[test]
    fn test_event_fields_are_camel_case() {
        let event = WorkflowEvent::Deleted {
            workflow_id: WorkflowId::generate(),
            page_id: PageId::new("page-1"),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "deleted");
        assert_eq!(value["pageId"], "page-1");
        assert!(value.get("page_id").is_none());
    }
}
