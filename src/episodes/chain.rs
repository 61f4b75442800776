use crate::domain::claim::{Claim, EntityId, Qualifier, Value};
use crate::domain::schema::Schema;

use super::context::SeasonContext;

/// Claims to submit on one episode entity to place it in the season chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    pub ordinal: u32,
    pub entity: EntityId,
    pub claims: Vec<Claim>,
}

/// Computes neighbour links for a positionally ordered episode list, where
/// `entities[0]` is ordinal 1. The first and last episodes get explicit
/// "no value" sentinels instead of a neighbour.
pub fn link(schema: &Schema, ctx: &SeasonContext, entities: &[EntityId]) -> Vec<LinkPlan> {
    let props = &schema.properties;

    entities
        .iter()
        .enumerate()
        .map(|(index, entity)| {
            let ordinal = index as u32 + 1;
            let mut membership = Claim::new(&props.season, Value::entity(&ctx.season))
                .with_qualifier(Qualifier::new(
                    &props.series_ordinal,
                    Value::string(ordinal.to_string()),
                ));
            let mut claims = Vec::with_capacity(3);

            match index.checked_sub(1).map(|prev| &entities[prev]) {
                Some(previous) => {
                    claims.push(Claim::new(&props.follows, Value::entity(previous)));
                    membership = membership
                        .with_qualifier(Qualifier::new(&props.follows, Value::entity(previous)));
                }
                None => {
                    claims.push(Claim::no_value(&props.follows));
                    membership = membership.with_qualifier(Qualifier::no_value(&props.follows));
                }
            }
            match entities.get(index + 1) {
                Some(next) => {
                    claims.push(Claim::new(&props.followed_by, Value::entity(next)));
                    membership = membership
                        .with_qualifier(Qualifier::new(&props.followed_by, Value::entity(next)));
                }
                None => {
                    claims.push(Claim::no_value(&props.followed_by));
                    membership =
                        membership.with_qualifier(Qualifier::no_value(&props.followed_by));
                }
            }

            claims.insert(0, membership);
            LinkPlan {
                ordinal,
                entity: entity.clone(),
                claims,
            }
        })
        .collect()
}
