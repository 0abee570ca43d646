//! locality-tool
//!
//! Command-line access to a JSON locality store: list and search display
//! rows, add and delete records, export, and run the import flow with a
//! chosen conflict strategy.
//!
//! Logging goes to stderr. `--verbose` honours `RUST_LOG` (default `info`),
//! `--quiet` silences everything, and the default level is `warn`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use locality_core::db::JsonFileStore;
use locality_core::hierarchy::search_rows;
use locality_core::models::{LocalityFilter, LocalityType};
use locality_core::services::import::{parse_import_str, Decision, ImportSession, ResolutionState};
use locality_core::{LocalityConfig, LocalityService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "locality-tool", about = "Region/Department/City data tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data file (overrides config and LOCALITY_DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print display rows
    List {
        /// Free-text search over names and codes
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only this level
        #[arg(long = "type", value_enum)]
        level: Option<Level>,

        /// Only children of this id
        #[arg(long)]
        parent: Option<i64>,

        /// Case-insensitive name pattern (regular expression)
        #[arg(long)]
        name: Option<String>,
    },

    /// Print per-level counts
    Stats,

    /// Create a locality with the next free code
    Add {
        #[arg(value_enum)]
        level: Level,

        name: String,

        /// Parent id (a Region for Departments, a Department for Cities)
        #[arg(long)]
        parent: Option<i64>,
    },

    /// Delete localities by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Import a JSON file
    Import {
        file: PathBuf,

        /// How to handle records matching existing ones
        #[arg(long, value_enum, default_value_t = Strategy::Interactive)]
        strategy: Strategy,

        /// Show the plan without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Export localities as a JSON array
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Only these ids
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<i64>>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Region,
    Department,
    City,
}

impl From<Level> for LocalityType {
    fn from(level: Level) -> Self {
        match level {
            Level::Region => LocalityType::Region,
            Level::Department => LocalityType::Department,
            Level::City => LocalityType::City,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Only insert records that match nothing
    Skip,
    /// Overwrite every matching record
    AcceptAll,
    /// Ask for each matching record
    Interactive,
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("off")
    } else if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = LocalityConfig::load(cli.config.as_deref()).await?;
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    let store = JsonFileStore::open(&config.data_path)
        .await
        .with_context(|| format!("Failed to open {}", config.data_path.display()))?;
    tracing::debug!("Using data file {}", store.path().display());
    let service = LocalityService::with_config(Arc::new(store), &config);

    match cli.command {
        Commands::List {
            search,
            level,
            parent,
            name,
        } => list(&service, search, level, parent, name).await,
        Commands::Stats => {
            let stats = service.stats().await?;
            println!("Regions:     {}", stats.regions);
            println!("Departments: {}", stats.departments);
            println!("Cities:      {}", stats.cities);
            println!("Total:       {}", stats.total());
            Ok(())
        }
        Commands::Add {
            level,
            name,
            parent,
        } => {
            let created = service
                .create_locality(level.into(), &name, parent)
                .await?;
            println!(
                "Created {} {} '{}' with code {}",
                created.type_id, created.id, created.name, created.code
            );
            Ok(())
        }
        Commands::Delete { ids } => {
            let result = service.delete_localities(&ids).await?;
            println!("Deleted {} of {} localities", result.deleted_count, ids.len());
            Ok(())
        }
        Commands::Import {
            file,
            strategy,
            dry_run,
        } => import(&service, file, strategy, dry_run, cli.quiet).await,
        Commands::Export { output, ids } => {
            let json = service.export(ids.as_deref()).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    if !cli.quiet {
                        println!("Exported to {}", path.display());
                    }
                }
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}

async fn list(
    service: &LocalityService,
    search: Option<String>,
    level: Option<Level>,
    parent: Option<i64>,
    name: Option<String>,
) -> Result<()> {
    let rows = if level.is_some() || parent.is_some() || name.is_some() {
        let mut filter = LocalityFilter::new();
        filter.type_id = level.map(LocalityType::from);
        filter.parent_id = parent;
        filter.name_pattern = name;

        let wanted: Vec<i64> = service.list(&filter).await?.iter().map(|l| l.id).collect();
        service
            .formatted_rows()
            .await?
            .into_iter()
            .filter(|row| wanted.contains(&row.id))
            .collect()
    } else {
        service.formatted_rows().await?
    };

    let query = search.unwrap_or_default();
    println!("{:<8} {:<24} {:<24} {:<24}", "CODE", "REGION", "DEPARTMENT", "CITY");
    for row in search_rows(&rows, &query) {
        println!(
            "{:<8} {:<24} {:<24} {:<24}",
            row.code, row.region, row.department, row.city
        );
    }
    Ok(())
}

async fn import(
    service: &LocalityService,
    file: PathBuf,
    strategy: Strategy,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let incoming = parse_import_str(&raw)?;

    let plan = service.plan_import(incoming).await?;
    println!(
        "{} new, {} conflicting, {} unchanged",
        plan.pure_new.len(),
        plan.conflicts.len(),
        plan.unchanged.len()
    );
    if dry_run {
        for conflict in &plan.conflicts {
            println!(
                "  conflict: incoming {} '{}' vs existing {} '{}'",
                conflict.incoming.id, conflict.incoming.name, conflict.existing.id, conflict.existing.name
            );
        }
        return Ok(());
    }

    let mut session = ImportSession::new();
    session.apply(Decision::Submit(plan))?;

    if let ResolutionState::Confirming { .. } = session.state() {
        match strategy {
            Strategy::Skip => {
                session.apply(Decision::SkipConflicts)?;
            }
            Strategy::AcceptAll => {
                session.apply(Decision::AcceptAll)?;
            }
            Strategy::Interactive => resolve_interactively(&mut session).await?,
        }
    }

    if !session.state().is_final() {
        println!("Import cancelled, nothing written");
        return Ok(());
    }

    let report = service
        .commit_import(&mut session, |progress| {
            if !quiet {
                eprintln!(
                    "  {}% ({}/{})",
                    progress.percent, progress.committed, progress.total
                );
            }
        })
        .await?;

    println!(
        "Imported: {} inserted, {} modified, {} matched",
        report.result.inserted, report.result.modified, report.result.matched
    );
    Ok(())
}

/// Prompt for each conflict on stdin: `k` keeps the stored record, `n` uses
/// the incoming one, `q` cancels the whole import
async fn resolve_interactively(session: &mut ImportSession) -> Result<()> {
    session.apply(Decision::ResolveOneByOne)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some((position, conflict)) = session.state().current_conflict() {
        println!(
            "[{}] existing {} '{}' (code {}) <- incoming {} '{}' (code {})",
            position + 1,
            conflict.existing.id,
            conflict.existing.name,
            conflict.existing.code,
            conflict.incoming.id,
            conflict.incoming.name,
            conflict.incoming.code
        );
        println!("    keep old [k], use new [n], cancel [q]?");

        let Some(answer) = lines.next_line().await? else {
            bail!("stdin closed before every conflict was resolved");
        };
        let decision = match answer.trim() {
            "k" | "keep" => Decision::KeepOld,
            "n" | "new" => Decision::UseNew,
            "q" | "quit" => Decision::Cancel,
            other => {
                println!("    unrecognised answer '{}'", other);
                continue;
            }
        };
        session.apply(decision)?;
    }

    Ok(())
}
