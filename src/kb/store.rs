use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::db::{self, EditLogRecord, InsertEditLog};
use crate::domain::claim::{Claim, Entity, EntityDraft, EntityId, Snak, Value};

use super::merge::{merge_claims, MergeReport};
use super::{EditMeta, KbError, KnowledgeBase};

/// Knowledge base persisted in the local SQLite store. Entity documents are
/// JSON; entity-valued claims are mirrored into `claim_edge` for reverse lookup.
pub struct SqliteKnowledgeBase {
    conn: Connection,
}

impl SqliteKnowledgeBase {
    pub fn open(path: &str) -> Result<Self, KbError> {
        Ok(Self::from_connection(db::open_connection(path)?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn edits(&self, edit_group: Option<&str>) -> Result<Vec<EditLogRecord>, KbError> {
        Ok(db::list_edit_log(&self.conn, edit_group)?)
    }

    fn load(&self, id: &str) -> Result<Option<Entity>, KbError> {
        match db::get_entity(&self.conn, id)? {
            Some(row) => {
                let body: EntityDraft = serde_json::from_str(&row.document)?;
                Ok(Some(Entity {
                    id: EntityId::new(row.id),
                    body,
                }))
            }
            None => Ok(None),
        }
    }
}

fn entity_edges(body: &EntityDraft) -> Vec<(&str, &str)> {
    body.claims
        .iter()
        .filter_map(|claim: &Claim| match &claim.snak {
            Snak::Value {
                value: Value::Entity { id },
            } => Some((claim.property.as_str(), id.as_str())),
            _ => None,
        })
        .collect()
}

fn persist(tx: &Transaction<'_>, id: &str, body: &EntityDraft, insert: bool) -> Result<(), KbError> {
    let document = serde_json::to_string(body)?;
    if insert {
        db::insert_entity(tx, id, &document)?;
    } else {
        db::update_entity_document(tx, id, &document)?;
    }
    db::replace_claim_edges(tx, id, &entity_edges(body))?;
    Ok(())
}

fn log_edit(tx: &Transaction<'_>, id: &str, edit: &EditMeta, report: &MergeReport) -> Result<(), KbError> {
    db::insert_edit_log(
        tx,
        &InsertEditLog {
            entity_id: id,
            operation: edit.operation,
            summary: &edit.summary,
            edit_group: edit.edit_group.as_deref(),
            claims_added: report.added,
            claims_updated: report.updated,
            claims_skipped: report.skipped,
        },
    )?;
    Ok(())
}

impl KnowledgeBase for SqliteKnowledgeBase {
    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, KbError> {
        self.load(id.as_str())
    }

    fn entities_claiming(
        &self,
        property: &str,
        target: &EntityId,
    ) -> Result<Vec<Entity>, KbError> {
        let mut out = Vec::new();
        for src in db::list_claim_sources(&self.conn, property, target.as_str())? {
            if let Some(entity) = self.load(&src)? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    fn create_entity(&mut self, draft: EntityDraft, edit: &EditMeta) -> Result<EntityId, KbError> {
        let tx = self.conn.transaction()?;
        let id = format!("Q{}", db::next_entity_seq(&tx)?);

        let EntityDraft {
            labels,
            aliases,
            descriptions,
            claims,
        } = draft;
        let mut body = EntityDraft {
            labels,
            aliases,
            descriptions,
            claims: Vec::new(),
        };
        let report = merge_claims(&mut body, claims);

        persist(&tx, &id, &body, true)?;
        log_edit(&tx, &id, edit, &report)?;
        tx.commit()?;
        debug!(entity = %id, summary = %edit.summary, "created entity");
        Ok(EntityId::new(id))
    }

    fn add_claims(
        &mut self,
        id: &EntityId,
        claims: Vec<Claim>,
        edit: &EditMeta,
    ) -> Result<MergeReport, KbError> {
        let mut entity = self
            .load(id.as_str())?
            .ok_or_else(|| KbError::NotFound(id.clone()))?;
        let report = merge_claims(&mut entity.body, claims);
        if !report.changed() {
            debug!(entity = %id, "no new claims to write");
            return Ok(report);
        }

        let tx = self.conn.transaction()?;
        persist(&tx, id.as_str(), &entity.body, false)?;
        log_edit(&tx, id.as_str(), edit, &report)?;
        tx.commit()?;
        debug!(
            entity = %id,
            added = report.added,
            updated = report.updated,
            skipped = report.skipped,
            "wrote claims"
        );
        Ok(report)
    }
}
