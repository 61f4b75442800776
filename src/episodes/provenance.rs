use crate::domain::claim::{Claim, EntityDraft, Reference, ReferenceSnak, UrlMatch, Value};
use crate::domain::schema::Schema;

/// The citation attached to every fact the engine asserts for one catalog
/// series. Built once per season and cloned onto each claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceReference {
    pub reference: Reference,
}

impl ProvenanceReference {
    pub fn for_catalog(schema: &Schema, catalog_id: &str) -> Self {
        let props = &schema.properties;
        let url_prefix = format!(
            "{}/anime/{}",
            schema.catalog.site.trim_end_matches('/'),
            catalog_id
        );
        let reference = Reference {
            snaks: vec![
                ReferenceSnak {
                    property: props.stated_in.clone(),
                    value: Value::entity(&schema.items.catalog),
                    match_key: true,
                },
                ReferenceSnak {
                    property: props.catalog_id.clone(),
                    value: Value::string(catalog_id),
                    match_key: true,
                },
                ReferenceSnak {
                    property: props.reference_url.clone(),
                    value: Value::string(format!("{url_prefix}/_/episode")),
                    match_key: false,
                },
            ],
            url_match: Some(UrlMatch {
                property: props.reference_url.clone(),
                prefix: url_prefix,
            }),
        };
        Self { reference }
    }

    pub fn tag(&self, claims: Vec<Claim>) -> Vec<Claim> {
        claims
            .into_iter()
            .map(|mut claim| {
                claim.references.push(self.reference.clone());
                claim
            })
            .collect()
    }

    pub fn tag_draft(&self, mut draft: EntityDraft) -> EntityDraft {
        draft.claims = self.tag(std::mem::take(&mut draft.claims));
        draft
    }
}
