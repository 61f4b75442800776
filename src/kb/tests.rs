use uuid::Uuid;

use crate::db;
use crate::domain::claim::{Claim, EntityDraft, EntityId, Qualifier, Value};

use super::{EditMeta, KbError, KnowledgeBase, SqliteKnowledgeBase};

fn open_store() -> (SqliteKnowledgeBase, String) {
    let path = std::env::temp_dir()
        .join(format!("epilink-kb-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string();
    let conn = db::open_connection(&path).expect("db should open");
    (SqliteKnowledgeBase::from_connection(conn), path)
}

fn cleanup(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

fn labelled(label: &str) -> EntityDraft {
    let mut draft = EntityDraft::default();
    draft.labels.insert("en".to_string(), label.to_string());
    draft
}

#[test]
fn created_entities_round_trip() {
    let (mut kb, path) = open_store();
    let edit = EditMeta::new("create", "Creating item.").in_group("g1");

    let mut draft = labelled("Show");
    draft.push_alias("en", "The Show".to_string());
    draft
        .claims
        .push(Claim::new("P31", Value::entity(&EntityId::new("Q5"))));
    let id = kb.create_entity(draft, &edit).expect("create should succeed");
    assert_eq!(id.as_str(), "Q1");

    let entity = kb.require_entity(&id).expect("entity should load");
    assert_eq!(entity.label("en"), Some("Show"));
    assert_eq!(entity.body.aliases["en"], vec!["The Show"]);
    assert_eq!(entity.claims("P31").count(), 1);

    let second = kb
        .create_entity(labelled("Other"), &edit)
        .expect("second create should succeed");
    assert_eq!(second.as_str(), "Q2");

    let edits = kb.edits(Some("g1")).expect("edit log should load");
    assert_eq!(edits.len(), 2);
    assert_eq!(edits[0].operation, "create");

    cleanup(&path);
}

#[test]
fn reverse_lookup_follows_entity_claims() {
    let (mut kb, path) = open_store();
    let edit = EditMeta::new("create", "Creating item.");
    let season = kb.create_entity(labelled("Season"), &edit).expect("season");

    let mut episode = labelled("Ep");
    episode.claims.push(
        Claim::new("P4908", Value::entity(&season))
            .with_qualifier(Qualifier::new("P1545", Value::string("1"))),
    );
    let episode_id = kb.create_entity(episode, &edit).expect("episode");
    kb.create_entity(labelled("Unrelated"), &edit)
        .expect("unrelated");

    let found = kb
        .entities_claiming("P4908", &season)
        .expect("lookup should succeed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, episode_id);
    assert!(kb
        .entities_claiming("P179", &season)
        .expect("lookup should succeed")
        .is_empty());

    cleanup(&path);
}

#[test]
fn unchanged_submissions_leave_no_edit() {
    let (mut kb, path) = open_store();
    let create = EditMeta::new("create", "Creating item.");
    let id = kb.create_entity(labelled("Season"), &create).expect("create");

    let edit = EditMeta::new("add_claims", "Adding data.");
    let claims = vec![Claim::new("P1113", Value::quantity(12))];
    let first = kb
        .add_claims(&id, claims.clone(), &edit)
        .expect("first add should succeed");
    assert_eq!(first.added, 1);

    let second = kb
        .add_claims(&id, claims, &edit)
        .expect("second add should succeed");
    assert!(!second.changed());
    assert_eq!(kb.edits(None).expect("edits").len(), 2);

    cleanup(&path);
}

#[test]
fn adding_claims_to_missing_entity_fails() {
    let (mut kb, path) = open_store();
    let err = kb
        .add_claims(
            &EntityId::new("Q404"),
            vec![Claim::no_value("P155")],
            &EditMeta::new("add_claims", "Adding data."),
        )
        .expect_err("missing entity should fail");
    assert!(matches!(err, KbError::NotFound(ref id) if id.as_str() == "Q404"));

    cleanup(&path);
}
