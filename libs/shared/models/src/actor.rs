use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role of an authenticated caller. Authentication itself happens upstream;
/// the engine only consults role-derived capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Patient,
    Doctor,
    Assistant,
    Admin,
}

impl ActorRole {
    /// Staff roles book on behalf of patients and skip the confirmation step.
    pub fn can_auto_confirm(&self) -> bool {
        matches!(self, ActorRole::Assistant | ActorRole::Admin)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, ActorRole::Assistant | ActorRole::Admin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Patient => write!(f, "patient"),
            ActorRole::Doctor => write!(f, "doctor"),
            ActorRole::Assistant => write!(f, "assistant"),
            ActorRole::Admin => write!(f, "admin"),
        }
    }
}

/// An already-authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: Uuid, role: ActorRole) -> Self {
        Self { id, role }
    }

    pub fn patient(id: Uuid) -> Self {
        Self::new(id, ActorRole::Patient)
    }

    pub fn doctor(id: Uuid) -> Self {
        Self::new(id, ActorRole::Doctor)
    }

    pub fn assistant(id: Uuid) -> Self {
        Self::new(id, ActorRole::Assistant)
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, ActorRole::Admin)
    }

    pub fn can_auto_confirm(&self) -> bool {
        self.role.can_auto_confirm()
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
