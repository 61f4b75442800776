use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use uuid::Uuid;

fn unique_workspace(prefix: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&path).expect("workspace should be creatable");
    path
}

fn run_epilink(root: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_epilink"))
        .arg("--db")
        .arg(root.join("kb.sqlite"))
        .args(args)
        .env_remove("EPILINK_SCHEMA")
        .env("EPILINK_RETRY_DELAY_SECS", "0")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("epilink should start");
    {
        let mut pipe = child.stdin.take().expect("stdin should be piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("stdin should be writable");
        }
    }
    child.wait_with_output().expect("epilink should finish")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success but failed.\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "expected failure but command succeeded.\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

/// Writes a two-page listing with `count` episodes for `catalog_id`.
fn write_catalog(root: &Path, catalog_id: &str, count: usize) -> PathBuf {
    let catalog = root.join("catalog");
    let entry = catalog.join(catalog_id);
    std::fs::create_dir_all(&entry).expect("catalog dir should be creatable");
    let rows: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "mal_id": n,
                "title": format!("Episode {n} title"),
                "title_japanese": format!("第{n}話"),
                "title_romanji": format!("Dai {n} wa"),
                "aired": format!("2022-04-{:02}T00:00:00+00:00", n),
            })
        })
        .collect();
    let split = count.div_ceil(2);
    for (page, chunk) in [&rows[..split], &rows[split..]].iter().enumerate() {
        let body = json!({
            "pagination": { "last_visible_page": 2, "has_next_page": page == 0 },
            "data": chunk,
        });
        std::fs::write(entry.join(format!("page-{}.json", page + 1)), body.to_string())
            .expect("page should be writable");
    }
    catalog
}

fn seed(root: &Path, catalog_id: Option<&str>) -> (String, String) {
    let series = run_epilink(root, &["series", "new", "--label", "Example", "--json"], None);
    assert_success(&series);
    let series_id = parse_json(&series)["id"]
        .as_str()
        .expect("series id")
        .to_string();

    let mut args: Vec<&str> = vec![
        "season",
        "new",
        "--label",
        "Example 2",
        "--series",
        series_id.as_str(),
        "--ordinal",
        "2",
        "--json",
    ];
    if let Some(id) = catalog_id {
        args.extend(["--catalog-id", id]);
    }
    let season = run_epilink(root, &args, None);
    assert_success(&season);
    let season_id = parse_json(&season)["id"]
        .as_str()
        .expect("season id")
        .to_string();
    (series_id, season_id)
}

#[test]
fn sync_creates_a_linked_season_from_catalog_files() {
    let root = unique_workspace("epilink-cli-sync");
    let catalog = write_catalog(&root, "40748", 3);
    let (_, season) = seed(&root, Some("40748"));

    let sync = run_epilink(
        &root,
        &[
            "sync",
            &season,
            "--catalog-dir",
            catalog.to_str().expect("utf8 path"),
            "--json",
        ],
        None,
    );
    assert_success(&sync);
    let report = parse_json(&sync);
    assert_eq!(report["seasons"][0]["created"], 3);
    assert_eq!(report["seasons"][0]["episodes"], 3);
    let group = report["edit_group"].as_str().expect("edit group").to_string();
    assert_eq!(group.len(), 10);

    let shown = run_epilink(&root, &["show", &season, "--json"], None);
    assert_success(&shown);
    let entity = parse_json(&shown);
    let parts: Vec<&Value> = entity["claims"]
        .as_array()
        .expect("claims")
        .iter()
        .filter(|claim| claim["property"] == "P527")
        .collect();
    assert_eq!(parts.len(), 3);

    let first_episode = parts[0]["value"]["id"].as_str().expect("episode id");
    let episode = run_epilink(&root, &["show", first_episode, "--json"], None);
    assert_success(&episode);
    let episode = parse_json(&episode);
    assert_eq!(episode["labels"]["ja"], "第1話");
    let follows = episode["claims"]
        .as_array()
        .expect("claims")
        .iter()
        .find(|claim| claim["property"] == "P155")
        .expect("follows claim");
    assert_eq!(follows["snak"], "no_value");

    let edits = run_epilink(&root, &["edits", "--group", &group, "--json"], None);
    assert_success(&edits);
    assert_eq!(parse_json(&edits).as_array().expect("edits").len(), 7);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rerunning_sync_is_a_no_op() {
    let root = unique_workspace("epilink-cli-rerun");
    let catalog = write_catalog(&root, "40748", 4);
    let (_, season) = seed(&root, Some("40748"));
    let catalog_arg = catalog.to_str().expect("utf8 path");

    assert_success(&run_epilink(
        &root,
        &["sync", &season, "--catalog-dir", catalog_arg],
        None,
    ));
    let again = run_epilink(
        &root,
        &["sync", &season, "--catalog-dir", catalog_arg, "--json"],
        None,
    );
    assert_success(&again);
    let report = parse_json(&again);
    assert_eq!(report["seasons"][0]["existing"], 4);
    assert_eq!(report["seasons"][0]["created"], 0);
    assert_eq!(report["seasons"][0]["claims_added"], 0);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_ids_are_read_from_stdin() {
    let root = unique_workspace("epilink-cli-prompt");
    let catalog = write_catalog(&root, "555", 2);
    let (_, season) = seed(&root, None);

    let sync = run_epilink(
        &root,
        &[
            "sync",
            "--catalog-dir",
            catalog.to_str().expect("utf8 path"),
            "--json",
        ],
        Some(&format!("{season}\n555\n")),
    );
    assert_success(&sync);
    let stderr = String::from_utf8_lossy(&sync.stderr);
    assert!(stderr.contains("Season item IDs"));
    assert!(stderr.contains("Catalog ID for season"));
    assert_eq!(parse_json(&sync)["seasons"][0]["catalog_id"], "555");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn closed_stdin_fails_instead_of_hanging() {
    let root = unique_workspace("epilink-cli-eof");
    let sync = run_epilink(&root, &["sync"], None);
    assert_failure(&sync);
    assert!(String::from_utf8_lossy(&sync.stderr).contains("error:"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn unknown_entities_are_reported() {
    let root = unique_workspace("epilink-cli-missing");
    let shown = run_epilink(&root, &["show", "Q404"], None);
    assert_failure(&shown);
    assert!(String::from_utf8_lossy(&shown.stderr).contains("entity 'Q404' not found"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn completions_print_to_stdout() {
    let root = unique_workspace("epilink-cli-completions");
    let output = run_epilink(&root, &["completions", "bash"], None);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("epilink"));
    let _ = std::fs::remove_dir_all(root);
}
