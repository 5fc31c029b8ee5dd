//! Quire command line
//!
//! Works on a domain definition file (JSON): content types, user types and
//! optional seed content.
//!
//! Usage:
//!   quire validate blog.json
//!   quire transition blog.json --type article --field status --transition publish --from review
//!   quire delete blog.json --id 0192f0c1-... [--config cascade.json]

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use quire_cli::{Definition, dry_run_transition, load_config, simulate_delete, validate};
use quire_fields::FieldTypeRegistry;
use quire_types::ContentId;
use std::{path::PathBuf, sync::Arc};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Quire content model tools")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check schemas, field settings and seed content
    Validate {
        /// Domain definition file
        definition: PathBuf,
    },
    /// Dry-run a workflow transition of a state field
    Transition {
        definition: PathBuf,
        /// Content type owning the field
        #[arg(long = "type")]
        content_type: String,
        /// State field identifier
        #[arg(long)]
        field: String,
        /// Current place (defaults to the initial place)
        #[arg(long)]
        from: Option<String>,
        /// Transition to apply
        #[arg(long)]
        transition: String,
    },
    /// Simulate a permanent delete of seed content
    Delete {
        definition: PathBuf,
        /// Id of the seed content to delete
        #[arg(long)]
        id: ContentId,
        /// Cascade config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let fields = Arc::new(FieldTypeRegistry::with_defaults());

    match args.command {
        Command::Validate { definition } => {
            let definition = Definition::load(&definition)?;
            let report = validate(&definition, &fields);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for violation in report.schemas.iter().chain(report.content.iter()) {
                    println!("  {violation}");
                }
            }
            if !report.is_empty() {
                bail!("{} violation(s) in domain '{}'", report.len(), definition.identifier());
            }
            info!("Domain '{}' is valid", definition.identifier());
        }
        Command::Transition {
            definition,
            content_type,
            field,
            from,
            transition,
        } => {
            let definition = Definition::load(&definition)?;
            let outcome = dry_run_transition(
                &definition,
                &fields,
                &content_type,
                &field,
                from.as_deref(),
                &transition,
            )?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{} -> {}", outcome.from, outcome.to);
                println!("  next: {}", outcome.enabled.join(", "));
            }
        }
        Command::Delete { definition, id, config } => {
            let definition = Definition::load(&definition)?;
            let config = load_config(config.as_deref())?;
            let simulation = simulate_delete(&definition, fields, id, config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&simulation)?);
            } else {
                for entry in &simulation.audit {
                    println!("  {}", entry.message);
                }
                println!(
                    "Deleted {} (+{} cascaded, {} nullified), {} instance(s) remain",
                    id,
                    simulation.report.deleted().len(),
                    simulation.report.nullified().len(),
                    simulation.remaining.len()
                );
            }
        }
    }

    Ok(())
}
