//! The authenticated caller of a workflow operation

use crate::UserId;
use serde::{Deserialize, Serialize};

/// A user performing an operation, with their administrator flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: UserId,
    #[serde(default)]
    pub admin: bool,
}

impl Operator {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            admin: false,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            admin: true,
        }
    }
}
