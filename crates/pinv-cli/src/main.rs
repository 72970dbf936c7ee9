//! pinv CLI
//!
//! Cross-validation of Petri net flow invariants computed by different
//! tools.
//!
//! # Commands
//!
//! - `pinv check <files>...` - Pairwise consistency (or, with
//!   `--minimality`, per-file redundancy) of persisted solution files
//! - `pinv logs <log-a> <log-b>` - Compare the place and transition flows of
//!   two raw tool logs
//! - `pinv collect --tool <tool> --log <log> --mode <mode>` - Move the
//!   invariants of a tool log into a `.sol` file

mod commands;
mod groups;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use pinv_parse::ToolKind;
use pinv_smt::{CompareOptions, SolverConfig, Z3Backend};
use tracing_subscriber::EnvFilter;

use crate::report::Status;

#[derive(Parser)]
#[command(name = "pinv")]
#[command(about = "Cross-validate Petri net flow invariants computed by different tools")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check persisted solution files for consistency or minimality
    Check(CheckArgs),
    /// Compare the place and transition flows of two tool logs
    Logs {
        /// First log
        log_a: PathBuf,
        /// Second log
        log_b: PathBuf,
        /// Tool that produced both logs (default: inferred from extensions)
        #[arg(long)]
        tool: Option<ToolKind>,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Move the invariants listed in a tool log into `<log>.sol`
    Collect {
        /// Tool that produced the log
        #[arg(long)]
        tool: ToolKind,
        /// Tool log (GreatSPN: the invariant file)
        #[arg(long)]
        log: PathBuf,
        /// Computation mode (pflows, psemiflows, tflows, tsemiflows, flows, semiflows)
        #[arg(long)]
        mode: pinv_parse::FlowKind,
        /// GreatSPN net description providing place and transition names
        #[arg(long)]
        net: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Compare every pair of files (default)
    #[arg(long, conflicts_with = "minimality")]
    consistency: bool,

    /// Report the invariants of each file implied by the others
    #[arg(long)]
    minimality: bool,

    /// Test every invariant against all others instead of dropping
    /// redundant ones as they are found
    #[arg(long, requires = "minimality")]
    independent: bool,

    /// Worker threads for --independent (default: number of cores)
    #[arg(long, requires = "independent")]
    workers: Option<usize>,

    #[command(flatten)]
    solver: SolverArgs,

    /// Solution files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Options shared by every solver-backed command
#[derive(Args, Debug, Clone)]
struct SolverArgs {
    /// Keep invariants present on both sides of a comparison
    #[arg(long)]
    no_dedup: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Per-query solver timeout in milliseconds
    #[arg(long, env = "PINV_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

impl SolverArgs {
    fn backend(&self) -> Z3Backend {
        let mut config = SolverConfig::new();
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        Z3Backend::new(config)
    }

    fn compare_options(&self) -> CompareOptions {
        CompareOptions::default().with_dedup(!self.no_dedup)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => {
            let (needed, mode) = if args.minimality {
                (1, "--minimality")
            } else {
                (2, "--consistency")
            };
            if args.files.len() < needed {
                Cli::command()
                    .error(
                        ErrorKind::TooFewValues,
                        format!("{} needs at least {} solution files", mode, needed),
                    )
                    .exit();
            }
            if args.minimality {
                commands::check_minimality(&args.files, &args.solver, args.independent, args.workers)
            } else {
                commands::check_consistency(&args.files, &args.solver)
            }
        }
        Commands::Logs {
            log_a,
            log_b,
            tool,
            solver,
        } => commands::compare_logs(&log_a, &log_b, tool, &solver),
        Commands::Collect {
            tool,
            log,
            mode,
            net,
        } => commands::collect(tool, &log, mode, net.as_deref()),
    };

    match result {
        Ok(Status::Clean) => ExitCode::SUCCESS,
        Ok(Status::Discrepant) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
