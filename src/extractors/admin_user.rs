//! Acting admin user from the `X-Admin-User` header, set by the authenticating proxy.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const ADMIN_USER_HEADER: &str = "X-Admin-User";

#[derive(Clone, Debug, PartialEq)]
pub struct AdminUser(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ADMIN_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(AdminUser(value))
    }
}
