//! Authenticated-user extraction.
//!
//! Identity is owned by an upstream collaborator which installs a trusted
//! `x-user-id` header on every authenticated request. Cart and checkout
//! handlers take an [`AuthUser`] argument; anonymous requests are redirected
//! to the login page rather than rejected with a bare 401.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .map(AuthUser)
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}
