use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const CURRENT_SCHEMA_VERSION: i64 = 2;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        name: "baseline_entity_store_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entity (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS claim_edge (
    src TEXT NOT NULL,
    property TEXT NOT NULL,
    dst TEXT NOT NULL,
    PRIMARY KEY (src, property, dst)
);

CREATE INDEX IF NOT EXISTS idx_claim_edge_dst_property ON claim_edge(dst, property);
"#,
    },
    Migration {
        version: 2,
        name: "edit_log_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS edit_log (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id TEXT NOT NULL,
    operation TEXT NOT NULL,
    summary TEXT NOT NULL,
    edit_group TEXT,
    claims_added INTEGER NOT NULL DEFAULT 0,
    claims_updated INTEGER NOT NULL DEFAULT 0,
    claims_skipped INTEGER NOT NULL DEFAULT 0,
    occurred_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_edit_log_group ON edit_log(edit_group);
"#,
    },
];

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, now_utc_rfc3339()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('next_entity_seq', '1')
ON CONFLICT(key) DO NOTHING
"#,
        [],
    )?;

    tx.commit()
}

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO meta (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![key, value],
    )?;
    Ok(())
}

/// Hands out the next numeric entity sequence and advances the counter.
pub fn next_entity_seq(conn: &Connection) -> Result<u64> {
    let current = get_meta(conn, "next_entity_seq")?
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1);
    set_meta(conn, "next_entity_seq", &(current + 1).to_string())?;
    Ok(current)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: String,
    pub document: String,
    pub created_at: String,
    pub updated_at: String,
}

pub fn insert_entity(conn: &Connection, id: &str, document: &str) -> Result<()> {
    let now = now_utc_rfc3339();
    conn.execute(
        "INSERT INTO entity (id, document, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![id, document, now],
    )?;
    Ok(())
}

pub fn update_entity_document(conn: &Connection, id: &str, document: &str) -> Result<()> {
    conn.execute(
        "UPDATE entity SET document = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, document, now_utc_rfc3339()],
    )?;
    Ok(())
}

pub fn get_entity(conn: &Connection, id: &str) -> Result<Option<EntityRow>> {
    conn.query_row(
        "SELECT id, document, created_at, updated_at FROM entity WHERE id = ?1",
        params![id],
        |row| {
            Ok(EntityRow {
                id: row.get(0)?,
                document: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn replace_claim_edges(conn: &Connection, src: &str, edges: &[(&str, &str)]) -> Result<()> {
    conn.execute("DELETE FROM claim_edge WHERE src = ?1", params![src])?;
    for (property, dst) in edges {
        conn.execute(
            "INSERT OR IGNORE INTO claim_edge (src, property, dst) VALUES (?1, ?2, ?3)",
            params![src, property, dst],
        )?;
    }
    Ok(())
}

pub fn list_claim_sources(conn: &Connection, property: &str, dst: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT src FROM claim_edge WHERE dst = ?1 AND property = ?2 ORDER BY src",
    )?;
    let mut rows = stmt.query(params![dst, property])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(row.get(0)?);
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditLogRecord {
    pub seq: i64,
    pub entity_id: String,
    pub operation: String,
    pub summary: String,
    pub edit_group: Option<String>,
    pub claims_added: u64,
    pub claims_updated: u64,
    pub claims_skipped: u64,
    pub occurred_at: String,
}

pub struct InsertEditLog<'a> {
    pub entity_id: &'a str,
    pub operation: &'a str,
    pub summary: &'a str,
    pub edit_group: Option<&'a str>,
    pub claims_added: u64,
    pub claims_updated: u64,
    pub claims_skipped: u64,
}

pub fn insert_edit_log(conn: &Connection, args: &InsertEditLog<'_>) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO edit_log (
    entity_id, operation, summary, edit_group,
    claims_added, claims_updated, claims_skipped, occurred_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#,
        params![
            args.entity_id,
            args.operation,
            args.summary,
            args.edit_group,
            args.claims_added as i64,
            args.claims_updated as i64,
            args.claims_skipped as i64,
            now_utc_rfc3339()
        ],
    )?;
    Ok(())
}

pub fn list_edit_log(conn: &Connection, edit_group: Option<&str>) -> Result<Vec<EditLogRecord>> {
    let mut stmt = conn.prepare(
        r#"
SELECT seq, entity_id, operation, summary, edit_group,
       claims_added, claims_updated, claims_skipped, occurred_at
FROM edit_log
WHERE ?1 IS NULL OR edit_group = ?1
ORDER BY seq ASC
"#,
    )?;
    let mut rows = stmt.query(params![edit_group])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(EditLogRecord {
            seq: row.get(0)?,
            entity_id: row.get(1)?,
            operation: row.get(2)?,
            summary: row.get(3)?,
            edit_group: row.get(4)?,
            claims_added: row.get::<_, i64>(5)? as u64,
            claims_updated: row.get::<_, i64>(6)? as u64,
            claims_skipped: row.get::<_, i64>(7)? as u64,
            occurred_at: row.get(8)?,
        });
    }
    Ok(result)
}
