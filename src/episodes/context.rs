use serde::Serialize;
use tracing::debug;

use crate::domain::claim::{EntityId, Value};
use crate::domain::schema::Schema;
use crate::kb::KnowledgeBase;
use crate::prompt::Prompter;

use super::errors::SyncError;

/// Everything the engine needs to know about one season, read once before
/// any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonContext {
    pub season: EntityId,
    pub series: EntityId,
    pub series_label: Option<String>,
    pub season_ordinal: Option<String>,
    pub catalog_id: String,
    pub declared_episode_count: Option<i64>,
}

pub fn resolve_context<K: KnowledgeBase + ?Sized>(
    kb: &K,
    schema: &Schema,
    season_id: &EntityId,
    prompter: &mut dyn Prompter,
) -> Result<SeasonContext, SyncError> {
    let props = &schema.properties;
    let season = kb.require_entity(season_id)?;

    let series_claim = season.first_claim(&props.part_of_series);
    let series = match series_claim
        .and_then(|claim| claim.value())
        .and_then(Value::as_entity)
    {
        Some(id) => id.clone(),
        None => EntityId::new(ask_required(
            prompter,
            &format!("Series item ID for season {}: ", season_id),
        )?),
    };
    let season_ordinal = series_claim
        .and_then(|claim| claim.qualifier(&props.series_ordinal))
        .and_then(|qualifier| qualifier.snak.value())
        .and_then(Value::as_text)
        .map(str::to_string);
    let series_label = kb
        .require_entity(&series)?
        .label("en")
        .map(str::to_string);

    let catalog_id = match season
        .first_claim(&props.catalog_id)
        .and_then(|claim| claim.value())
        .and_then(Value::as_text)
    {
        Some(id) => id.to_string(),
        None => ask_required(
            prompter,
            &format!("Catalog ID for season {}: ", season_id),
        )?,
    };
    let declared_episode_count = season
        .first_claim(&props.number_of_episodes)
        .and_then(|claim| claim.value())
        .and_then(Value::as_quantity);

    let context = SeasonContext {
        season: season.id,
        series,
        series_label,
        season_ordinal,
        catalog_id,
        declared_episode_count,
    };
    debug!(?context, "resolved season context");
    Ok(context)
}

fn ask_required(prompter: &mut dyn Prompter, question: &str) -> Result<String, SyncError> {
    let answer = prompter.ask(question).map_err(SyncError::Prompt)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(SyncError::MissingContext(format!(
            "no answer given for '{}'",
            question.trim()
        )));
    }
    Ok(answer.to_string())
}
