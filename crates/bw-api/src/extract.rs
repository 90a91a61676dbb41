//! Request extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the staff user id of the caller.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Staff user performing the request, taken from the `x-actor-id` header.
///
/// The header is optional; anonymous requests extract as `ActorId(None)`.
/// A present but non-integer value is rejected with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorId(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_ID_HEADER) else {
            return Ok(ActorId(None));
        };

        let text = value.to_str().map_err(|_| {
            ApiError::BadRequest(format!("{} header must be valid UTF-8", ACTOR_ID_HEADER))
        })?;
        let id = text.trim().parse::<i64>().map_err(|_| {
            ApiError::BadRequest(format!(
                "{} header must be an integer staff user id",
                ACTOR_ID_HEADER
            ))
        })?;

        Ok(ActorId(Some(id)))
    }
}
