//! Actor extractor
//!
//! The authentication layer in front of this service resolves credentials
//! and forwards the actor identity in headers. The extractor only reads the
//! resolved identity; credential verification never happens here.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::types::{Actor, ActorRole};

use crate::core::AppError;

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_NAME_HEADER: &str = "x-actor-name";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";
const RESTAURANT_HEADER: &str = "x-restaurant-id";

/// Resolved actor identity attached to the request by the auth layer
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(actor) = parts.extensions.get::<CurrentActor>() {
            return Ok(actor.clone());
        }

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        let id = header(ACTOR_ID_HEADER)
            .ok_or_else(|| AppError::Forbidden("missing resolved actor identity".to_string()))?;
        let restaurant_id = header(RESTAURANT_HEADER)
            .ok_or_else(|| AppError::Forbidden("missing restaurant scope".to_string()))?;
        let name = header(ACTOR_NAME_HEADER).unwrap_or_else(|| id.clone());
        let role = header(ACTOR_ROLE_HEADER)
            .and_then(|r| r.parse::<ActorRole>().ok())
            .unwrap_or(ActorRole::Staff);

        let actor = CurrentActor(Actor::new(id, name, role, restaurant_id));
        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}
