//! Cross-cutting platform types

use serde::{Deserialize, Serialize};

/// Resolved actor identity, supplied by the authentication layer.
///
/// The core never verifies credentials; it trusts this struct and performs
/// only tenant-scope checks (restaurant id match) on top of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    /// User id or guest/device token, as resolved upstream
    pub id: String,
    /// Display name snapshot (for audit trails)
    pub name: String,
    pub role: ActorRole,
    /// Restaurant scope the actor is operating in
    pub restaurant_id: String,
}

impl Actor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: ActorRole,
        restaurant_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            restaurant_id: restaurant_id.into(),
        }
    }

    /// Tenant check: does this actor operate in the given restaurant?
    pub fn scoped_to(&self, restaurant_id: &str) -> bool {
        self.restaurant_id == restaurant_id
    }
}

/// Actor role as resolved by the auth layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Owner,
    Manager,
    Staff,
    /// Automated callers (delivery integrations, internal services)
    Service,
}

impl std::str::FromStr for ActorRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(ActorRole::Owner),
            "MANAGER" => Ok(ActorRole::Manager),
            "STAFF" => Ok(ActorRole::Staff),
            "SERVICE" => Ok(ActorRole::Service),
            _ => Err(()),
        }
    }
}
