mod app;
mod catalog;
mod cli;
mod completions;
mod db;
mod domain;
mod episodes;
mod kb;
mod prompt;

use std::time::Duration;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::app::SyncReport;
use crate::catalog::{CatalogClient, DirCatalog, HttpCatalog};
use crate::db::EditLogRecord;
use crate::domain::claim::{Entity, Snak, Value};
use crate::prompt::{split_ids, Prompter, StdioPrompter};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

// Quiet by default; RUST_LOG=info or RUST_LOG=debug for progress output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<(), app::AppError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", text);
    Ok(())
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::{Commands, SeasonSubcommands, SeriesSubcommands};

    let cli = cli::Cli::parse();
    let open = || app::App::open(&cli.db, cli.schema.as_deref());

    match cli.command {
        Commands::Sync(args) => {
            let mut app = open()?;
            let mut prompter = StdioPrompter;
            let raw = match args.seasons {
                Some(raw) => raw,
                None => prompter.ask("Season item IDs (separate several with |): ")?,
            };
            let seasons = split_ids(&raw);
            let delay = Duration::from_secs(args.retry_delay_secs);
            let report = match args.catalog_dir {
                Some(dir) => {
                    let catalog = CatalogClient::new(DirCatalog::new(dir), delay);
                    app.sync_seasons(&seasons, &catalog, &mut prompter)?
                }
                None => {
                    let catalog = CatalogClient::new(HttpCatalog::new(&args.catalog_base), delay);
                    app.sync_seasons(&seasons, &catalog, &mut prompter)?
                }
            };
            if args.json {
                print_json(&report)?;
            } else {
                print_sync_report(&report);
            }
        }
        Commands::Series(args) => match args.command {
            SeriesSubcommands::New(args) => {
                let entity = open()?.create_series(&args.label)?;
                print_entity_or_json(&entity, args.json)?;
            }
        },
        Commands::Season(args) => match args.command {
            SeasonSubcommands::New(args) => {
                let entity = open()?.create_season(
                    &args.label,
                    &args.series,
                    args.ordinal,
                    args.catalog_id.as_deref(),
                )?;
                print_entity_or_json(&entity, args.json)?;
            }
        },
        Commands::Show(args) => {
            let entity = open()?.show(&args.id)?;
            print_entity_or_json(&entity, args.json)?;
        }
        Commands::Edits(args) => {
            let edits = open()?.edits(args.group.as_deref())?;
            if args.json {
                print_json(&edits)?;
            } else if edits.is_empty() {
                println!("no edits");
            } else {
                for edit in &edits {
                    println!("{}", format_edit(edit));
                }
            }
        }
        Commands::Completions(args) => {
            completions::generate_completions(args.shell, &mut std::io::stdout().lock());
        }
    }

    Ok(())
}

fn print_sync_report(report: &SyncReport) {
    for season in &report.seasons {
        println!(
            "{}: {} episodes ({} existing, {} created), {} claims added, {} skipped",
            season.season,
            season.episodes,
            season.existing,
            season.created,
            season.claims_added,
            season.claims_skipped
        );
    }
    if let Some(group) = &report.edit_group {
        println!("edit group {}", group);
    }
}

fn print_entity_or_json(entity: &Entity, json: bool) -> Result<(), app::AppError> {
    if json {
        return print_json(entity);
    }
    println!("{}", format_entity(entity));
    Ok(())
}

fn format_entity(entity: &Entity) -> String {
    let mut lines = vec![format!(
        "{} {}",
        entity.id,
        entity.label("en").unwrap_or("(no label)")
    )];
    for (lang, label) in &entity.body.labels {
        if lang != "en" {
            lines.push(format!("  label[{}]: {}", lang, label));
        }
    }
    for (lang, description) in &entity.body.descriptions {
        lines.push(format!("  description[{}]: {}", lang, description));
    }
    for (lang, aliases) in &entity.body.aliases {
        lines.push(format!("  aliases[{}]: {}", lang, aliases.join(" | ")));
    }
    for claim in &entity.body.claims {
        let mut line = format!("  {} = {}", claim.property, format_snak(&claim.snak));
        if !claim.qualifiers.is_empty() {
            let qualifiers: Vec<String> = claim
                .qualifiers
                .iter()
                .map(|q| format!("{}={}", q.property, format_snak(&q.snak)))
                .collect();
            line.push_str(&format!(" ({})", qualifiers.join(", ")));
        }
        if !claim.references.is_empty() {
            line.push_str(&format!(" [{} ref]", claim.references.len()));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn format_snak(snak: &Snak) -> String {
    match snak {
        Snak::NoValue => "(no value)".to_string(),
        Snak::Value { value } => match value {
            Value::Entity { id } => id.to_string(),
            Value::String { value } => format!("\"{}\"", value),
            Value::Quantity { amount } => amount.to_string(),
            Value::Time { date, .. } => date.to_string(),
            Value::Monolingual { text, language } => format!("\"{}\"@{}", text, language),
        },
    }
}

fn format_edit(edit: &EditLogRecord) -> String {
    format!(
        "{:>5} {} {:<8} {:<20} [{}] +{} ~{} !{} {}",
        edit.seq,
        edit.occurred_at,
        edit.entity_id,
        edit.operation,
        edit.edit_group.as_deref().unwrap_or("-"),
        edit.claims_added,
        edit.claims_updated,
        edit.claims_skipped,
        edit.summary
    )
}
