use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::catalog::CatalogSource;
use crate::db::EditLogRecord;
use crate::domain::claim::{Claim, Entity, EntityDraft, EntityId, Qualifier, Value};
use crate::domain::schema::{Schema, SchemaError};
use crate::episodes::{resolve_context, EditGroup, SeasonSummary, SeasonSync, SyncError};
use crate::kb::{EditMeta, KbError, KnowledgeBase, SqliteKnowledgeBase};
use crate::prompt::Prompter;

pub struct App {
    kb: SqliteKnowledgeBase,
    schema: Schema,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub edit_group: Option<EditGroup>,
    pub seasons: Vec<SeasonSummary>,
}

impl App {
    pub fn open(db_path: &str, schema_path: Option<&Path>) -> Result<Self, AppError> {
        ensure_parent_dir(db_path)?;
        let schema = Schema::load(schema_path)?;
        let kb = SqliteKnowledgeBase::open(db_path)?;
        Ok(Self { kb, schema })
    }

    /// Syncs each season in order. Every edit of the invocation lands in one
    /// edit group, minted by the first season that writes.
    pub fn sync_seasons(
        &mut self,
        seasons: &[String],
        catalog: &dyn CatalogSource,
        prompter: &mut dyn Prompter,
    ) -> Result<SyncReport, AppError> {
        if seasons.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one season id is required".to_string(),
            ));
        }

        let mut group: Option<EditGroup> = None;
        let mut summaries = Vec::with_capacity(seasons.len());
        for raw in seasons {
            let season = parse_entity_id(raw)?;
            let ctx = resolve_context(&self.kb, &self.schema, &season, prompter)?;
            let records = catalog.episodes(&ctx.catalog_id);
            let (summary, used) =
                SeasonSync::new(&mut self.kb, &self.schema).run(&ctx, &records, group.take())?;
            group = Some(used);
            summaries.push(summary);
        }
        info!(seasons = summaries.len(), "sync finished");
        Ok(SyncReport {
            edit_group: group,
            seasons: summaries,
        })
    }

    pub fn create_series(&mut self, label: &str) -> Result<Entity, AppError> {
        let draft = labelled_draft(label)?;
        let id = self
            .kb
            .create_entity(draft, &EditMeta::new("create_series", "Creating series item."))?;
        Ok(self.kb.require_entity(&id)?)
    }

    pub fn create_season(
        &mut self,
        label: &str,
        series: &str,
        ordinal: Option<u32>,
        catalog_id: Option<&str>,
    ) -> Result<Entity, AppError> {
        let series = parse_entity_id(series)?;
        self.kb.require_entity(&series)?;
        let props = &self.schema.properties;

        let mut membership = Claim::new(&props.part_of_series, Value::entity(&series));
        if let Some(ordinal) = ordinal {
            membership = membership.with_qualifier(Qualifier::new(
                &props.series_ordinal,
                Value::string(ordinal.to_string()),
            ));
        }
        let mut draft = labelled_draft(label)?;
        draft.claims.push(membership);
        if let Some(catalog_id) = catalog_id.map(str::trim).filter(|id| !id.is_empty()) {
            draft
                .claims
                .push(Claim::new(&props.catalog_id, Value::string(catalog_id)));
        }

        let id = self
            .kb
            .create_entity(draft, &EditMeta::new("create_season", "Creating season item."))?;
        Ok(self.kb.require_entity(&id)?)
    }

    pub fn show(&self, id: &str) -> Result<Entity, AppError> {
        Ok(self.kb.require_entity(&parse_entity_id(id)?)?)
    }

    pub fn edits(&self, edit_group: Option<&str>) -> Result<Vec<EditLogRecord>, AppError> {
        Ok(self.kb.edits(edit_group)?)
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn parse_entity_id(raw: &str) -> Result<EntityId, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidArgument(format!(
            "invalid entity id '{}'",
            raw
        )));
    }
    Ok(EntityId::new(trimmed))
}

fn labelled_draft(label: &str) -> Result<EntityDraft, AppError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(AppError::InvalidArgument("label must not be empty".to_string()));
    }
    let mut draft = EntityDraft::default();
    draft.labels.insert("en".to_string(), label.to_string());
    Ok(draft)
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Kb(KbError),
    Sync(SyncError),
    Schema(SchemaError),
    InvalidArgument(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Kb(err) => write!(f, "{}", err),
            AppError::Sync(err) => write!(f, "sync error: {}", err),
            AppError::Schema(err) => write!(f, "schema error: {}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Kb(err) => Some(err),
            AppError::Sync(err) => Some(err),
            AppError::Schema(err) => Some(err),
            AppError::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<KbError> for AppError {
    fn from(value: KbError) -> Self {
        AppError::Kb(value)
    }
}

impl From<SyncError> for AppError {
    fn from(value: SyncError) -> Self {
        AppError::Sync(value)
    }
}

impl From<SchemaError> for AppError {
    fn from(value: SchemaError) -> Self {
        AppError::Schema(value)
    }
}

#[cfg(test)]
mod tests;
