use serde::Serialize;
use tracing::{info, info_span};

use crate::catalog::EpisodeRecord;
use crate::domain::claim::{EntityDraft, EntityId};
use crate::domain::schema::Schema;
use crate::kb::{EditMeta, KnowledgeBase, MergeReport};

use super::aggregate::season_claims;
use super::builder::EpisodeEntityBuilder;
use super::chain::link;
use super::context::SeasonContext;
use super::edit_group::EditGroup;
use super::errors::SyncError;
use super::provenance::ProvenanceReference;
use super::reconcile::{find_existing_episodes, reconcile};

pub const CREATE_EPISODE_OP: &str = "create_episode_item";
pub const LINK_EPISODE_OP: &str = "add_episode_links";
pub const SEASON_LINKS_OP: &str = "add_season_links";

const CREATE_SUMMARY: &str = "Creating episode item.";
const LINK_SUMMARY: &str = "Adding episode sequential data.";
const SEASON_SUMMARY: &str = "Adding episodes to season.";

/// One position in the season sequence, before or after it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeEntity {
    Existing(EntityId),
    Pending(EntityDraft),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SeasonSummary {
    pub season: EntityId,
    pub catalog_id: String,
    pub episodes: usize,
    pub existing: usize,
    pub created: usize,
    pub linked: usize,
    pub edit_group: EditGroup,
    pub claims_added: u64,
    pub claims_updated: u64,
    pub claims_skipped: u64,
}

pub struct SeasonSync<'a, K: ?Sized> {
    kb: &'a mut K,
    schema: &'a Schema,
}

impl<'a, K: KnowledgeBase + ?Sized> SeasonSync<'a, K> {
    pub fn new(kb: &'a mut K, schema: &'a Schema) -> Self {
        Self { kb, schema }
    }

    /// Brings one season in line with the catalog listing: creates missing
    /// episodes, links every episode to its neighbours, then records the
    /// season's parts. Invariant checks run before the first write.
    pub fn run(
        &mut self,
        ctx: &SeasonContext,
        records: &[EpisodeRecord],
        group: Option<EditGroup>,
    ) -> Result<(SeasonSummary, EditGroup), SyncError> {
        let found = find_existing_episodes(&*self.kb, self.schema, &ctx.season)?;
        let plan = reconcile(ctx, records, found)?;
        let group = EditGroup::continue_from(group);
        let provenance = ProvenanceReference::for_catalog(self.schema, &ctx.catalog_id);
        let builder = EpisodeEntityBuilder::new(self.schema, ctx);
        info!(
            season = %ctx.season,
            episodes = records.len(),
            existing = plan.existing.len(),
            edit_group = %group,
            "syncing season"
        );

        let mut totals = MergeReport::default();
        let sequence: Vec<EpisodeEntity> = plan
            .existing
            .iter()
            .cloned()
            .map(EpisodeEntity::Existing)
            .chain(plan.missing.iter().map(|record| {
                EpisodeEntity::Pending(provenance.tag_draft(builder.build(record)))
            }))
            .collect();

        let mut ids = Vec::with_capacity(sequence.len());
        let mut created = 0;
        for (index, episode) in sequence.into_iter().enumerate() {
            let id = match episode {
                EpisodeEntity::Existing(id) => id,
                EpisodeEntity::Pending(draft) => {
                    let _span = info_span!(
                        "create_episode_item",
                        season = %ctx.season,
                        ordinal = index + 1
                    )
                    .entered();
                    let edit = self.edit(CREATE_EPISODE_OP, CREATE_SUMMARY, &group);
                    let id = self.kb.create_entity(draft, &edit)?;
                    info!(entity = %id, ordinal = index + 1, "created episode");
                    created += 1;
                    id
                }
            };
            ids.push(id);
        }

        for link_plan in link(self.schema, ctx, &ids) {
            let _span = info_span!(
                "add_episode_links",
                entity = %link_plan.entity,
                ordinal = link_plan.ordinal
            )
            .entered();
            let edit = self.edit(LINK_EPISODE_OP, LINK_SUMMARY, &group);
            let claims = provenance.tag(link_plan.claims);
            let report = self.kb.add_claims(&link_plan.entity, claims, &edit)?;
            totals.absorb(report);
        }

        {
            let _span = info_span!("add_season_links", season = %ctx.season).entered();
            let edit = self.edit(SEASON_LINKS_OP, SEASON_SUMMARY, &group);
            let report = self.kb.add_claims(
                &ctx.season,
                provenance.tag(season_claims(self.schema, &ids)),
                &edit,
            )?;
            totals.absorb(report);
        }

        let summary = SeasonSummary {
            season: ctx.season.clone(),
            catalog_id: ctx.catalog_id.clone(),
            episodes: ids.len(),
            existing: plan.existing.len(),
            created,
            linked: ids.len(),
            edit_group: group.clone(),
            claims_added: totals.added,
            claims_updated: totals.updated,
            claims_skipped: totals.skipped,
        };
        info!(
            season = %summary.season,
            created = summary.created,
            claims_added = summary.claims_added,
            "season synced"
        );
        Ok((summary, group))
    }

    fn edit(&self, operation: &'static str, summary: &str, group: &EditGroup) -> EditMeta {
        EditMeta::new(operation, summary).in_group(group.as_str())
    }
}
