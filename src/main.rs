//! Command-line front end for applying assistant replies to a workbook.
//!
//! ```bash
//! # Apply a reply read from stdin
//! echo 'SET_VALUE|A1|Revenue' | gridpilot apply
//!
//! # Preview what a reply would do
//! gridpilot check reply.txt
//!
//! # Revert the last applied batch
//! gridpilot undo
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gridpilot::config::{data_dir, load_config, load_config_from};
use gridpilot::executor::{ExecutionResult, Executor};
use gridpilot::history::persistence::{load_history, save_history};
use gridpilot::host::memory::{load_workbook, render_sheet, save_workbook};
use gridpilot::host::Workbook;
use gridpilot::turn::{Turn, TurnStatus};

#[derive(Parser)]
#[command(name = "gridpilot")]
#[command(version)]
#[command(about = "Apply assistant spreadsheet commands to a workbook, with undo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workbook file (default ~/.gridpilot/workbook.yaml)
    #[arg(long, global = true)]
    workbook: Option<PathBuf>,

    /// Undo history file (default ~/.gridpilot/history.yaml)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Config file (default ~/.gridpilot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, validate and execute a reply
    Apply {
        /// Reply files, applied in order (reads stdin if none)
        files: Vec<PathBuf>,

        /// Print each turn as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the prose, commands and validation verdict without executing
    Check {
        /// Reply files (reads stdin if none)
        files: Vec<PathBuf>,
    },

    /// Revert the most recently applied batch
    Undo,
}

/// Workbook, executor and the files they persist to.
struct Session {
    workbook: Workbook,
    executor: Executor,
    workbook_path: PathBuf,
    history_path: PathBuf,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => load_config().unwrap_or_default(),
        };
        let workbook_path = data_path(cli.workbook.as_deref(), "workbook.yaml");
        let history_path = data_path(cli.history.as_deref(), "history.yaml");

        let workbook = load_workbook(&workbook_path)
            .with_context(|| format!("failed to load workbook {}", workbook_path.display()))?;
        let history = load_history(&history_path, config.undo_depth)
            .with_context(|| format!("failed to load history {}", history_path.display()))?;

        Ok(Self {
            workbook,
            executor: Executor::from_config(&config).with_history(history),
            workbook_path,
            history_path,
        })
    }

    fn save(&self) -> Result<()> {
        save_workbook(&self.workbook_path, &self.workbook).with_context(|| {
            format!("failed to save workbook {}", self.workbook_path.display())
        })?;
        save_history(&self.history_path, self.executor.history()).with_context(|| {
            format!("failed to save history {}", self.history_path.display())
        })
    }
}

fn data_path(explicit: Option<&Path>, file: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => data_dir().join(file),
    }
}

/// Read each file, or stdin when none were given.
fn read_replies(files: &[PathBuf]) -> Result<Vec<String>> {
    if files.is_empty() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(vec![buf]);
    }
    files
        .iter()
        .map(|f| {
            std::fs::read_to_string(f).with_context(|| format!("failed to read {}", f.display()))
        })
        .collect()
}

fn print_result(result: &ExecutionResult) {
    println!(
        "{} command(s) executed{}",
        result.executed,
        if result.success { "" } else { " with errors" }
    );
    for err in &result.errors {
        println!("  error: {err}");
    }
}

fn print_turn(turn: &Turn) {
    if !turn.prose.is_empty() {
        println!("{}", turn.prose);
        println!();
    }
    match &turn.status {
        TurnStatus::NoCommands => println!("no commands"),
        TurnStatus::Rejected { errors } => {
            println!("rejected, nothing executed:");
            for err in errors {
                println!("  {err}");
            }
        }
        TurnStatus::Ready => {
            for cmd in &turn.commands {
                println!("  {cmd}");
            }
            println!("valid, {} command(s) ready", turn.commands.len());
        }
        TurnStatus::Executed(result) => print_result(result),
    }
}

/// Returns whether every turn went through cleanly.
fn cmd_apply(cli: &Cli, files: &[PathBuf], json: bool) -> Result<bool> {
    let replies = read_replies(files)?;
    let mut session = Session::open(cli)?;
    let mut clean = true;

    for reply in &replies {
        let turn = session.executor.run_turn(&mut session.workbook, reply);
        clean &= match &turn.status {
            TurnStatus::Executed(result) => result.success,
            TurnStatus::Rejected { .. } => false,
            TurnStatus::NoCommands | TurnStatus::Ready => true,
        };
        if json {
            println!("{}", serde_json::to_string(&turn)?);
        } else {
            print_turn(&turn);
        }
    }

    session.save()?;
    if !json {
        println!();
        println!("{}", render_sheet(session.workbook.active()));
    }
    Ok(clean)
}

fn cmd_check(files: &[PathBuf]) -> Result<bool> {
    let mut clean = true;
    for reply in read_replies(files)? {
        let turn = Turn::preview(&reply);
        clean &= !matches!(turn.status, TurnStatus::Rejected { .. });
        print_turn(&turn);
    }
    Ok(clean)
}

fn cmd_undo(cli: &Cli) -> Result<bool> {
    let mut session = Session::open(cli)?;
    let result = session.executor.undo(&mut session.workbook);
    print_result(&result);
    session.save()?;
    Ok(result.success)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Apply { files, json } => cmd_apply(&cli, files, *json),
        Commands::Check { files } => cmd_check(files),
        Commands::Undo => cmd_undo(&cli),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

