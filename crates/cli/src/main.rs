use anyhow::{bail, Context, Result};
use billshare_import::import::import_statement;
use billshare_import::{match_and_split_bills_with_history, BillHistory, NoHistory};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod history;
mod report;

use history::HistoryFile;
use report::SplitReport;

#[derive(Parser, Debug)]
#[command(name = "billshare", version, about = "Split recurring household bills from bank statements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement CSV and list its transactions
    Parse {
        statement: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Match recurring bills in a statement and split them across occupants
    Split {
        statement: PathBuf,

        /// Config file (defaults to the platform config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured occupant count
        #[arg(
            long,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(..=config::MAX_OCCUPANTS)
        )]
        occupants: Option<i64>,

        /// JSON file of bills issued by earlier runs
        #[arg(long)]
        history: Option<PathBuf>,

        /// Append this run's bills to the history file
        #[arg(long, requires = "history")]
        record: bool,

        #[arg(long)]
        json: bool,
    },

    /// Print the effective bill pattern table in match order
    Patterns {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a default config file
    InitConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { statement, json } => {
            let parsed = import_statement(&statement)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print!("{}", report::render_statement(&parsed));
            }
        }

        Command::Split {
            statement,
            config,
            occupants,
            history,
            record,
            json,
        } => {
            split(
                &statement,
                config.as_deref(),
                occupants,
                history.as_deref(),
                record,
                json,
            )?;
        }

        Command::Patterns { config } => {
            let cfg = config::load_config(config.as_deref())?;
            let table = cfg.pattern_table()?;
            for p in table.patterns() {
                let mut line = format!(
                    "{:>4}  {:<28} -> {}",
                    p.priority,
                    format!("{:?} ({:?})", p.pattern, p.match_type),
                    p.merchant
                );
                if let Some(days) = p.days {
                    line.push_str(&format!("  [{days}]"));
                }
                println!("{line}");
            }
        }

        Command::InitConfig { config } => {
            let path = config::init_config(config.as_deref())?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn split(
    statement: &Path,
    config_path: Option<&Path>,
    occupants_override: Option<i64>,
    history_path: Option<&Path>,
    record: bool,
    json: bool,
) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let table = cfg.pattern_table()?;

    let configured = cfg.household.occupant_count()?;
    let Some(occupant_count) = occupants_override.or(configured) else {
        bail!("no occupant count: pass --occupants or set household.occupants in the config");
    };

    let parsed = import_statement(statement)?;
    tracing::info!(
        "Parsed {} transactions from {} ({} unparsed lines)",
        parsed.records.len(),
        statement.display(),
        parsed.errors.len()
    );

    let mut history_file = history_path.map(HistoryFile::load).transpose()?;
    let history: &dyn BillHistory = match &history_file {
        Some(h) => h,
        None => &NoHistory,
    };

    let outcome =
        match_and_split_bills_with_history(&parsed.records, &table, occupant_count, history)
            .context("cannot split bills")?;

    let labels = cfg.household.share_labels(occupant_count);
    let report = SplitReport::new(&outcome, &parsed.errors, &labels);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_split(&report));
    }

    if record {
        if let Some(h) = history_file.as_mut() {
            h.record(&outcome.matches);
            h.save()?;
            tracing::info!(
                "Recorded {} bills ({} in history)",
                outcome.matches.len(),
                h.bills().len()
            );
        }
    }

    Ok(())
}
