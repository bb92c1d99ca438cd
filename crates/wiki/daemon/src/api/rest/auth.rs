//! Operator extraction from trusted proxy headers
//!
//! Authentication happens in front of the daemon. The proxy forwards the
//! authenticated user in `x-wiki-user-id` and the admin flag in
//! `x-wiki-user-admin`.

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use wiki_workflow_types::{Operator, UserId};

pub const USER_ID_HEADER: &str = "x-wiki-user-id";
pub const USER_ADMIN_HEADER: &str = "x-wiki-user-admin";

/// The operator making the request
#[derive(Debug, Clone)]
pub struct AuthenticatedOperator(pub Operator);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedOperator
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        let admin = match parts.headers.get(USER_ADMIN_HEADER) {
            None => false,
            Some(value) => match value.to_str().map(str::trim) {
                Ok(v) if v.eq_ignore_ascii_case("true") => true,
                Ok(v) if v.eq_ignore_ascii_case("false") => false,
                _ => {
                    return Err(ApiError::BadRequest(format!(
                        "{} must be true or false",
                        USER_ADMIN_HEADER
                    )))
                }
            },
        };

        Ok(AuthenticatedOperator(Operator {
            id: UserId::new(id),
            admin,
        }))
    }
}
