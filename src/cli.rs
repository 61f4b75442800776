use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::catalog::{DEFAULT_API_BASE, DEFAULT_RETRY_DELAY};

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "epilink")]
#[command(bin_name = "epilink")]
#[command(version)]
#[command(about = "Sync catalog episode listings into a linked knowledge base")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "EPILINK_DB_PATH",
        default_value = ".epilink/kb.sqlite",
        help = "Path to the knowledge-base SQLite store."
    )]
    pub db: String,

    #[arg(
        long,
        env = "EPILINK_SCHEMA",
        help = "TOML file overriding property and item ids."
    )]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create and link episode entities for one or more seasons.")]
    Sync(SyncArgs),
    #[command(about = "Seed series entities.")]
    Series(SeriesArgs),
    #[command(about = "Seed season entities.")]
    Season(SeasonArgs),
    #[command(about = "Show one entity by id.")]
    Show(ShowArgs),
    #[command(about = "List recorded edits.")]
    Edits(EditsArgs),
    #[command(about = "Print shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(help = "Season ids, pipe-delimited (e.g. 'Q10|Q11'). Prompted if omitted.")]
    pub seasons: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Read catalog pages from DIR/<catalog-id>/page-<n>.json instead of the API."
    )]
    pub catalog_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "EPILINK_CATALOG_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Base URL of the episode catalog API."
    )]
    pub catalog_base: String,

    #[arg(
        long,
        env = "EPILINK_RETRY_DELAY_SECS",
        default_value_t = DEFAULT_RETRY_DELAY.as_secs(),
        help = "Seconds to wait before retrying a failed catalog page."
    )]
    pub retry_delay_secs: u64,

    #[arg(long, help = "Render JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    #[command(subcommand)]
    pub command: SeriesSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum SeriesSubcommands {
    #[command(about = "Create a series entity.")]
    New(SeriesNewArgs),
}

#[derive(Debug, Args)]
pub struct SeriesNewArgs {
    #[arg(long, help = "English label.")]
    pub label: String,

    #[arg(long, help = "Render JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SeasonArgs {
    #[command(subcommand)]
    pub command: SeasonSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum SeasonSubcommands {
    #[command(about = "Create a season entity belonging to a series.")]
    New(SeasonNewArgs),
}

#[derive(Debug, Args)]
pub struct SeasonNewArgs {
    #[arg(long, help = "English label.")]
    pub label: String,

    #[arg(long, help = "Series entity id.")]
    pub series: String,

    #[arg(long, help = "Season number within the series.")]
    pub ordinal: Option<u32>,

    #[arg(long, help = "Catalog id of the season's episode listing.")]
    pub catalog_id: Option<String>,

    #[arg(long, help = "Render JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(help = "Entity id.")]
    pub id: String,

    #[arg(long, help = "Render JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct EditsArgs {
    #[arg(long, help = "Only edits in this edit group.")]
    pub group: Option<String>,

    #[arg(long, help = "Render JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for.")]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_defaults_use_live_catalog() {
        let cli = Cli::try_parse_from(["epilink", "sync", "Q1|Q2"]).expect("parse");
        assert_eq!(cli.db, ".epilink/kb.sqlite");
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.seasons.as_deref(), Some("Q1|Q2"));
                assert_eq!(args.catalog_base, DEFAULT_API_BASE);
                assert_eq!(args.retry_delay_secs, 5);
                assert!(args.catalog_dir.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn season_new_parses_optional_fields() {
        let cli = Cli::try_parse_from([
            "epilink",
            "-d",
            "/tmp/kb.sqlite",
            "season",
            "new",
            "--label",
            "Season 2",
            "--series",
            "Q1",
            "--ordinal",
            "2",
            "--json",
        ])
        .expect("parse");
        assert_eq!(cli.db, "/tmp/kb.sqlite");
        match cli.command {
            Commands::Season(SeasonArgs {
                command: SeasonSubcommands::New(args),
            }) => {
                assert_eq!(args.series, "Q1");
                assert_eq!(args.ordinal, Some(2));
                assert!(args.catalog_id.is_none());
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_shell_is_rejected() {
        assert!(Cli::try_parse_from(["epilink", "completions", "tcsh"]).is_err());
    }
}
