use crate::catalog::EpisodeRecord;
use crate::domain::claim::{EntityId, Snak, Value};
use crate::domain::schema::Schema;
use crate::kb::{KbError, KnowledgeBase};

use super::context::SeasonContext;
use super::errors::InvariantViolation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingEpisode {
    pub id: EntityId,
    pub ordinal: Option<u32>,
    /// Carries a "followed by: no value" claim from an earlier run.
    pub ends_chain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan<'a> {
    /// Existing episode entities in ordinal order; index 0 is ordinal 1.
    pub existing: Vec<EntityId>,
    /// Records with no entity yet. Always a suffix of the catalog listing.
    pub missing: &'a [EpisodeRecord],
}

/// Reads back every entity whose season-membership claim targets the season,
/// with the ordinal from that claim's series-ordinal qualifier.
pub fn find_existing_episodes<K: KnowledgeBase + ?Sized>(
    kb: &K,
    schema: &Schema,
    season: &EntityId,
) -> Result<Vec<ExistingEpisode>, KbError> {
    let props = &schema.properties;
    let members = kb.entities_claiming(&props.season, season)?;
    Ok(members
        .into_iter()
        .map(|entity| {
            let ordinal = entity
                .claims(&props.season)
                .filter(|claim| claim.value().and_then(Value::as_entity) == Some(season))
                .find_map(|claim| {
                    claim
                        .qualifier(&props.series_ordinal)
                        .and_then(|qualifier| qualifier.snak.value())
                        .and_then(Value::as_text)
                        .and_then(|raw| raw.trim().parse::<u32>().ok())
                });
            let ends_chain = entity
                .claims(&props.followed_by)
                .any(|claim| claim.snak == Snak::NoValue);
            ExistingEpisode {
                id: entity.id,
                ordinal,
                ends_chain,
            }
        })
        .collect())
}

pub fn reconcile<'a>(
    ctx: &SeasonContext,
    records: &'a [EpisodeRecord],
    mut existing: Vec<ExistingEpisode>,
) -> Result<ReconcilePlan<'a>, InvariantViolation> {
    if let Some(declared) = ctx.declared_episode_count {
        if declared != records.len() as i64 {
            return Err(InvariantViolation::DeclaredCountMismatch {
                season: ctx.season.clone(),
                declared,
                catalog: records.len(),
            });
        }
    }
    if existing.len() > records.len() {
        return Err(InvariantViolation::TooManyExisting {
            season: ctx.season.clone(),
            existing: existing.len(),
            catalog: records.len(),
        });
    }

    existing.sort_by_key(|episode| (episode.ordinal.is_none(), episode.ordinal));
    for (index, episode) in existing.iter().enumerate() {
        let expected = index as u32 + 1;
        match episode.ordinal {
            Some(ordinal) if ordinal == expected => {}
            Some(ordinal) => {
                return Err(InvariantViolation::NonContiguousExisting {
                    season: ctx.season.clone(),
                    detail: format!(
                        "expected ordinal {} but found {} on {}",
                        expected, ordinal, episode.id
                    ),
                })
            }
            None => {
                return Err(InvariantViolation::NonContiguousExisting {
                    season: ctx.season.clone(),
                    detail: format!("{} has no ordinal qualifier", episode.id),
                })
            }
        }
    }

    // A "no next episode" marker is only valid on the catalog's last episode.
    if let Some(episode) = existing
        .iter()
        .take(records.len().saturating_sub(1))
        .find(|episode| episode.ends_chain)
    {
        return Err(InvariantViolation::ChainEndsEarly {
            season: ctx.season.clone(),
            entity: episode.id.clone(),
            catalog: records.len(),
        });
    }

    let reused = existing.len();
    Ok(ReconcilePlan {
        existing: existing.into_iter().map(|episode| episode.id).collect(),
        missing: &records[reused..],
    })
}
