use serde::Serialize;

use crate::domain::claim::{Claim, EntityDraft, Reference, Value};

/// Counts produced by folding submitted claims into an entity.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MergeReport {
    pub added: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub skipped: u64,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }

    pub fn absorb(&mut self, other: MergeReport) {
        self.added += other.added;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }
}

/// Folds `incoming` into `target` without duplicating anything already there.
///
/// A claim whose property and snak already exist is merged in place: missing
/// qualifiers are appended and each reference is merged into the first
/// matching reference instead of being added again. A claim flagged
/// `skip_if_conflicting` is dropped when the property already carries a
/// different value.
pub fn merge_claims(target: &mut EntityDraft, incoming: Vec<Claim>) -> MergeReport {
    let mut report = MergeReport::default();
    for mut claim in incoming {
        let position = target
            .claims
            .iter()
            .position(|existing| existing.property == claim.property && existing.snak == claim.snak);
        match position {
            Some(index) => {
                if merge_into(&mut target.claims[index], claim) {
                    report.updated += 1;
                } else {
                    report.unchanged += 1;
                }
            }
            None => {
                let conflicting = target
                    .claims
                    .iter()
                    .any(|existing| existing.property == claim.property);
                if claim.skip_if_conflicting && conflicting {
                    report.skipped += 1;
                    continue;
                }
                claim.skip_if_conflicting = false;
                let references = std::mem::take(&mut claim.references);
                for reference in references {
                    merge_reference(&mut claim.references, reference);
                }
                target.claims.push(claim);
                report.added += 1;
            }
        }
    }
    report
}

fn merge_into(existing: &mut Claim, incoming: Claim) -> bool {
    let mut changed = false;
    for qualifier in incoming.qualifiers {
        if !existing.qualifiers.contains(&qualifier) {
            existing.qualifiers.push(qualifier);
            changed = true;
        }
    }
    for reference in incoming.references {
        changed |= merge_reference(&mut existing.references, reference);
    }
    changed
}

fn merge_reference(references: &mut Vec<Reference>, incoming: Reference) -> bool {
    match references
        .iter_mut()
        .find(|existing| reference_matches(existing, &incoming))
    {
        Some(existing) => {
            let mut changed = false;
            for snak in incoming.snaks {
                if !existing.contains(&snak.property, &snak.value) {
                    existing.snaks.push(snak);
                    changed = true;
                }
            }
            changed
        }
        None => {
            references.push(incoming);
            true
        }
    }
}

/// An existing reference cites the same source when one of its URLs falls
/// under the incoming reference's URL prefix (the prefix itself, or followed
/// by `/` or `?`), or when it carries every
/// match-key snak of the incoming reference with an equal value.
pub fn reference_matches(existing: &Reference, incoming: &Reference) -> bool {
    if let Some(url) = incoming.url_match.as_ref() {
        let url_hit = existing.snaks.iter().any(|snak| {
            snak.property == url.property
                && matches!(&snak.value, Value::String { value } if under_prefix(value, &url.prefix))
        });
        if url_hit {
            return true;
        }
    }
    let mut keys = incoming.snaks.iter().filter(|snak| snak.match_key).peekable();
    if keys.peek().is_none() {
        return false;
    }
    keys.all(|key| existing.contains(&key.property, &key.value))
}

fn under_prefix(url: &str, prefix: &str) -> bool {
    match url.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
