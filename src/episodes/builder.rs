use crate::catalog::EpisodeRecord;
use crate::domain::claim::{Claim, EntityDraft, Qualifier, Value};
use crate::domain::schema::Schema;

use super::context::SeasonContext;

const PRIMARY_LANGUAGE: &str = "en";
const NATIVE_LANGUAGE: &str = "ja";

/// Produces the complete description of a new episode entity. Performs no
/// writes; provenance is attached by the caller before submission.
pub struct EpisodeEntityBuilder<'a> {
    schema: &'a Schema,
    ctx: &'a SeasonContext,
}

impl<'a> EpisodeEntityBuilder<'a> {
    pub fn new(schema: &'a Schema, ctx: &'a SeasonContext) -> Self {
        Self { schema, ctx }
    }

    pub fn build(&self, record: &EpisodeRecord) -> EntityDraft {
        let mut draft = EntityDraft::default();
        draft
            .labels
            .insert(PRIMARY_LANGUAGE.to_string(), record.title_primary.clone());

        for alias in episode_aliases(
            record,
            self.ctx.series_label.as_deref(),
            self.ctx.season_ordinal.as_deref(),
        ) {
            draft.push_alias(PRIMARY_LANGUAGE, alias);
        }
        if let Some(description) = episode_description(
            record.ordinal,
            self.ctx.series_label.as_deref(),
            self.ctx.season_ordinal.as_deref(),
        ) {
            draft
                .descriptions
                .insert(PRIMARY_LANGUAGE.to_string(), description);
        }
        if let Some(native) = record.title_native.as_deref() {
            draft
                .labels
                .insert(NATIVE_LANGUAGE.to_string(), native.to_string());
        }

        draft.claims = self.claims(record);
        draft
    }

    fn claims(&self, record: &EpisodeRecord) -> Vec<Claim> {
        let props = &self.schema.properties;
        let items = &self.schema.items;

        let mut claims = vec![
            Claim::new(&props.instance_of, Value::entity(&items.anime_tv_episode)),
            Claim::new(&props.origin_country, Value::entity(&items.japan)),
            Claim::new(&props.original_language, Value::entity(&items.japanese)),
        ];
        if let Some(date) = record.air_date {
            claims.push(Claim::new(&props.publication_date, Value::day(date)));
        }
        claims.push(Claim::new(
            &props.part_of_series,
            Value::entity(&self.ctx.series),
        ));
        if let Some(native) = record.title_native.as_deref() {
            claims.push(Claim::new(
                &props.title,
                Value::monolingual(native, NATIVE_LANGUAGE),
            ));
        }
        claims.push(
            Claim::new(&props.season, Value::entity(&self.ctx.season)).with_qualifier(
                Qualifier::new(&props.series_ordinal, Value::string(record.ordinal.to_string())),
            ),
        );
        claims
    }
}

pub fn episode_aliases(
    record: &EpisodeRecord,
    series_label: Option<&str>,
    season_ordinal: Option<&str>,
) -> Vec<String> {
    let mut aliases = Vec::new();
    if let Some(romanized) = record.title_romanized.as_deref() {
        if romanized.trim() != record.title_primary.trim() {
            aliases.push(romanized.to_string());
        }
    }

    let Some(series) = series_label else {
        return aliases;
    };
    let n = record.ordinal;
    aliases.push(format!("{series} Episode {n}"));
    aliases.push(format!("{series} ep {n}"));
    aliases.push(format!("{series} ep. {n}"));
    aliases.push(format!("{series} ep{n}"));

    if let Some(s) = season_ordinal {
        aliases.push(format!("{series} Season {s} Episode {n}"));
        aliases.push(format!("{series} Season {s} ep {n}"));
        aliases.push(format!("{series} Season {s} ep. {n}"));
        aliases.push(format!("{series} S {s} ep {n}"));
        aliases.push(format!("{series} S {s} ep. {n}"));
        aliases.push(format!("{series} S{s}EP{n}"));
        aliases.push(format!("{series} S{s:0>2}EP{n:02}"));
        aliases.push(format!("{series} S{s}E{n}"));
        aliases.push(format!("{series} S{s:0>2}E{n:02}"));
    }
    aliases
}

pub fn episode_description(
    ordinal: u32,
    series_label: Option<&str>,
    season_ordinal: Option<&str>,
) -> Option<String> {
    let series = series_label.filter(|label| !label.is_empty())?;
    Some(match season_ordinal {
        Some(season) => format!("Episode {ordinal} of {series} Season {season}"),
        None => format!("Episode {ordinal} of {series}"),
    })
}
