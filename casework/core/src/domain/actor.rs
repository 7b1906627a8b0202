use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity performing a command, as resolved by the authentication layer.
///
/// Carried into history entries and assignment/approval fields. The engine
/// treats the id as opaque; it never resolves roles or claims itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ActorError> {
        let id = id.into().trim().to_string();
        let name = name.into().trim().to_string();

        if id.is_empty() {
            return Err(ActorError::MissingId);
        }
        if name.is_empty() {
            return Err(ActorError::MissingName);
        }

        Ok(Self { id, name })
    }

    /// Identity used by automated jobs (the refresh sweeper, schedulers).
    pub fn system() -> Self {
        Self {
            id: "system".to_string(),
            name: "System".to_string(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("Actor id must not be empty")]
    MissingId,

    #[error("Actor name must not be empty")]
    MissingName,
}
