mod aggregate;
mod builder;
mod chain;
mod context;
mod edit_group;
mod errors;
mod provenance;
mod reconcile;
mod service;

pub use context::resolve_context;
pub use edit_group::EditGroup;
pub use errors::SyncError;
pub use service::{SeasonSummary, SeasonSync};
