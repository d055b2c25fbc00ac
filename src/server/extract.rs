//! Request extractors.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::services::Actor;

/// Actor identity from the `x-actor-id` and `x-actor-privileged` headers.
/// Absent or malformed headers yield the anonymous, unprivileged actor;
/// authenticating the headers is the deployment's concern, not ours.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let privileged = parts
            .headers
            .get("x-actor-privileged")
            .and_then(|v| v.to_str().ok())
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Actor { id, privileged })
    }
}
