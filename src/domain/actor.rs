//! Identity of the administrator performing an operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Maximum accepted length of an actor identity.
pub const MAX_ACTOR_LEN: usize = 128;

/// Administrator identity passed explicitly into every mutating operation.
///
/// The engine never reads identity from ambient session state; the caller
/// (which owns authentication) supplies it on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Builds an actor from a raw identity string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if the identity is blank or
    /// longer than [`MAX_ACTOR_LEN`] characters.
    pub fn new(identity: impl Into<String>) -> Result<Self, EngineError> {
        let identity = identity.into().trim().to_string();
        if identity.is_empty() {
            return Err(EngineError::InvalidRequest(
                "actor identity must not be empty".to_string(),
            ));
        }
        if identity.chars().count() > MAX_ACTOR_LEN {
            return Err(EngineError::InvalidRequest(format!(
                "actor identity exceeds {MAX_ACTOR_LEN} characters"
            )));
        }
        Ok(Self(identity))
    }

    /// Returns the identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_identity() {
        let actor = Actor::new("  admin@example.org ");
        assert!(matches!(actor, Ok(ref a) if a.as_str() == "admin@example.org"));
    }

    #[test]
    fn rejects_blank_identity() {
        assert!(Actor::new("   ").is_err());
    }

    #[test]
    fn rejects_overlong_identity() {
        assert!(Actor::new("x".repeat(MAX_ACTOR_LEN + 1)).is_err());
    }
}
