use std::error::Error;
use std::fmt;

use crate::domain::claim::EntityId;
use crate::kb::KbError;

/// Irreconcilable mismatch between the catalog and the knowledge base. Never
/// retried and never repaired automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    DeclaredCountMismatch {
        season: EntityId,
        declared: i64,
        catalog: usize,
    },
    TooManyExisting {
        season: EntityId,
        existing: usize,
        catalog: usize,
    },
    NonContiguousExisting {
        season: EntityId,
        detail: String,
    },
    ChainEndsEarly {
        season: EntityId,
        entity: EntityId,
        catalog: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::DeclaredCountMismatch {
                season,
                declared,
                catalog,
            } => write!(
                f,
                "season {} declares {} episodes but the catalog lists {}",
                season, declared, catalog
            ),
            InvariantViolation::TooManyExisting {
                season,
                existing,
                catalog,
            } => write!(
                f,
                "season {} already has {} linked episodes but the catalog lists only {}",
                season, existing, catalog
            ),
            InvariantViolation::NonContiguousExisting { season, detail } => write!(
                f,
                "season {} has existing episodes that do not form a 1..k sequence: {}",
                season, detail
            ),
            InvariantViolation::ChainEndsEarly {
                season,
                entity,
                catalog,
            } => write!(
                f,
                "season {}: {} is marked as the last episode but the catalog lists {}",
                season, entity, catalog
            ),
        }
    }
}

impl Error for InvariantViolation {}

#[derive(Debug)]
pub enum SyncError {
    Invariant(InvariantViolation),
    Kb(KbError),
    MissingContext(String),
    Prompt(std::io::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Invariant(err) => write!(f, "invariant violation: {}", err),
            SyncError::Kb(err) => write!(f, "knowledge base error: {}", err),
            SyncError::MissingContext(message) => write!(f, "{}", message),
            SyncError::Prompt(err) => write!(f, "prompt failed: {}", err),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SyncError::Invariant(err) => Some(err),
            SyncError::Kb(err) => Some(err),
            SyncError::MissingContext(_) => None,
            SyncError::Prompt(err) => Some(err),
        }
    }
}

impl From<InvariantViolation> for SyncError {
    fn from(value: InvariantViolation) -> Self {
        SyncError::Invariant(value)
    }
}

impl From<KbError> for SyncError {
    fn from(value: KbError) -> Self {
        SyncError::Kb(value)
    }
}
