use std::error::Error;
use std::fmt;

use crate::domain::claim::{Claim, Entity, EntityDraft, EntityId};

pub mod merge;
mod store;
#[cfg(test)]
mod tests;

pub use merge::MergeReport;
pub use store::SqliteKnowledgeBase;

/// Attribution attached to one transactional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMeta {
    pub operation: &'static str,
    pub summary: String,
    pub edit_group: Option<String>,
}

impl EditMeta {
    pub fn new(operation: &'static str, summary: impl Into<String>) -> Self {
        Self {
            operation,
            summary: summary.into(),
            edit_group: None,
        }
    }

    pub fn in_group(mut self, edit_group: impl Into<String>) -> Self {
        self.edit_group = Some(edit_group.into());
        self
    }
}

/// Knowledge-base primitives the episode sync depends on. Every write is one
/// transactional unit: it either commits entirely or not at all.
pub trait KnowledgeBase {
    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, KbError>;

    /// Entities carrying a `property` claim whose value is `target`.
    fn entities_claiming(&self, property: &str, target: &EntityId)
        -> Result<Vec<Entity>, KbError>;

    fn create_entity(&mut self, draft: EntityDraft, edit: &EditMeta) -> Result<EntityId, KbError>;

    /// Submits claims through the duplicate-suppressing merge in [`merge`].
    fn add_claims(
        &mut self,
        id: &EntityId,
        claims: Vec<Claim>,
        edit: &EditMeta,
    ) -> Result<MergeReport, KbError>;

    fn require_entity(&self, id: &EntityId) -> Result<Entity, KbError> {
        self.entity(id)?
            .ok_or_else(|| KbError::NotFound(id.clone()))
    }
}

#[derive(Debug)]
pub enum KbError {
    Db(rusqlite::Error),
    Json(serde_json::Error),
    NotFound(EntityId),
}

impl fmt::Display for KbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KbError::Db(err) => write!(f, "database error: {}", err),
            KbError::Json(err) => write!(f, "entity document error: {}", err),
            KbError::NotFound(id) => write!(f, "entity '{}' not found", id),
        }
    }
}

impl Error for KbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KbError::Db(err) => Some(err),
            KbError::Json(err) => Some(err),
            KbError::NotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for KbError {
    fn from(value: rusqlite::Error) -> Self {
        KbError::Db(value)
    }
}

impl From<serde_json::Error> for KbError {
    fn from(value: serde_json::Error) -> Self {
        KbError::Json(value)
    }
}
