use crate::domain::claim::{Claim, EntityId, Qualifier, Value};
use crate::domain::schema::Schema;

/// Season-level claims: the episode count and one ordinal-qualified
/// has-parts claim per episode. An existing, different count is left alone.
pub fn season_claims(schema: &Schema, episodes: &[EntityId]) -> Vec<Claim> {
    let props = &schema.properties;
    let mut claims = Vec::with_capacity(episodes.len() + 1);
    claims.push(
        Claim::new(&props.number_of_episodes, Value::quantity(episodes.len() as i64))
            .skip_if_conflicting(),
    );
    claims.extend(episodes.iter().enumerate().map(|(index, episode)| {
        Claim::new(&props.has_parts, Value::entity(episode)).with_qualifier(Qualifier::new(
            &props.series_ordinal,
            Value::string((index + 1).to_string()),
        ))
    }));
    claims
}
