//! REST API under `/_api/v3`

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod router;
pub mod state;
