use std::collections::HashMap;
use std::path::PathBuf;

use uuid::Uuid;

use super::{App, AppError};
use crate::catalog::{CatalogSource, EpisodeRecord};
use crate::domain::claim::Value;
use crate::episodes::SyncError;
use crate::prompt::ScriptedPrompter;

/// In-memory catalog keyed by catalog id.
#[derive(Default)]
struct VecCatalog {
    listings: HashMap<String, Vec<EpisodeRecord>>,
}

impl VecCatalog {
    fn with(mut self, catalog_id: &str, count: u32) -> Self {
        let records = (1..=count)
            .map(|ordinal| EpisodeRecord {
                ordinal,
                title_primary: format!("Episode title {ordinal}"),
                title_native: None,
                title_romanized: None,
                air_date: None,
            })
            .collect();
        self.listings.insert(catalog_id.to_string(), records);
        self
    }
}

impl CatalogSource for VecCatalog {
    fn episodes(&self, catalog_id: &str) -> Vec<EpisodeRecord> {
        self.listings.get(catalog_id).cloned().unwrap_or_default()
    }
}

fn unique_db() -> (PathBuf, String) {
    let root = std::env::temp_dir().join(format!("epilink-app-test-{}", Uuid::now_v7()));
    let db = root.join(".epilink/kb.sqlite").display().to_string();
    (root, db)
}

#[test]
fn open_creates_parent_directories() {
    let (root, db) = unique_db();
    App::open(&db, None).expect("app should open");
    assert!(root.join(".epilink").is_dir());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn seeded_season_syncs_end_to_end() {
    let (root, db) = unique_db();
    let mut app = App::open(&db, None).expect("app should open");
    let series = app.create_series("Example").expect("series");
    let season = app
        .create_season("Example 2", series.id.as_str(), Some(2), Some("40748"))
        .expect("season");

    let catalog = VecCatalog::default().with("40748", 3);
    let mut prompter = ScriptedPrompter::new(&[]);
    let report = app
        .sync_seasons(&[season.id.to_string()], &catalog, &mut prompter)
        .expect("sync should succeed");

    assert_eq!(report.seasons.len(), 1);
    assert_eq!(report.seasons[0].created, 3);
    assert!(prompter.asked.is_empty());

    let shown = app.show(season.id.as_str()).expect("season should load");
    assert_eq!(shown.claims("P527").count(), 3);
    assert_eq!(
        shown.first_claim("P1113").and_then(|c| c.value()),
        Some(&Value::quantity(3))
    );

    let group = report.edit_group.expect("edit group");
    let edits = app.edits(Some(group.as_str())).expect("edit log");
    assert_eq!(edits.len(), 3 + 3 + 1);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn several_seasons_share_one_group() {
    let (root, db) = unique_db();
    let mut app = App::open(&db, None).expect("app should open");
    let series = app.create_series("Example").expect("series");
    let first = app
        .create_season("S1", series.id.as_str(), Some(1), Some("10"))
        .expect("season 1");
    let second = app
        .create_season("S2", series.id.as_str(), Some(2), None)
        .expect("season 2");

    let catalog = VecCatalog::default().with("10", 2).with("20", 2);
    let mut prompter = ScriptedPrompter::new(&["20"]);
    let report = app
        .sync_seasons(
            &[first.id.to_string(), second.id.to_string()],
            &catalog,
            &mut prompter,
        )
        .expect("sync should succeed");

    assert_eq!(prompter.asked.len(), 1, "only the second season lacks a catalog id");
    assert_eq!(report.seasons.len(), 2);
    assert_eq!(report.seasons[0].edit_group, report.seasons[1].edit_group);
    assert_eq!(report.edit_group.as_ref(), Some(&report.seasons[1].edit_group));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn invariant_violation_surfaces_as_sync_error() {
    let (root, db) = unique_db();
    let mut app = App::open(&db, None).expect("app should open");
    let series = app.create_series("Example").expect("series");
    let season = app
        .create_season("S1", series.id.as_str(), Some(1), Some("10"))
        .expect("season");

    let mut prompter = ScriptedPrompter::new(&[]);
    app.sync_seasons(
        &[season.id.to_string()],
        &VecCatalog::default().with("10", 3),
        &mut prompter,
    )
    .expect("first sync");

    let err = app
        .sync_seasons(
            &[season.id.to_string()],
            &VecCatalog::default().with("10", 2),
            &mut prompter,
        )
        .expect_err("shrunken catalog should abort");
    match err {
        AppError::Sync(SyncError::Invariant(_)) => {}
        other => panic!("unexpected error: {other}"),
    }
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn argument_errors_are_reported() {
    let (root, db) = unique_db();
    let mut app = App::open(&db, None).expect("app should open");
    let mut prompter = ScriptedPrompter::new(&[]);

    assert!(matches!(
        app.sync_seasons(&[], &VecCatalog::default(), &mut prompter),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        app.create_series("   "),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        app.create_season("S1", "Q999", None, None),
        Err(AppError::Kb(_))
    ));
    assert!(matches!(app.show("Q 1"), Err(AppError::InvalidArgument(_))));
    let _ = std::fs::remove_dir_all(root);
}
