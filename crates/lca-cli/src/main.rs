mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lca",
    version,
    about = "Life-cycle impact and circularity calculator for process chains"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Reference data and factor table options shared by all calculations.
#[derive(Args)]
pub struct DataArgs {
    /// Registered materials and processes (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Custom factor tables (JSON); defaults to the built-in tables
    #[arg(short, long, value_name = "FILE")]
    pub factors: Option<PathBuf>,

    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table")]
    pub output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate impacts and circularity for a process chain
    Calculate {
        /// Calculation input (JSON)
        input_file: PathBuf,

        #[command(flatten)]
        data: DataArgs,

        /// Show per-step breakdown and applied defaults
        #[arg(long)]
        verbose: bool,

        /// Add rule-based improvement suggestions
        #[arg(long)]
        advise: bool,
    },
    /// Compare a baseline against a modified scenario
    WhatIf {
        /// Baseline calculation input (JSON)
        baseline: PathBuf,

        /// Scenario input with its own steps (JSON)
        #[arg(long, value_name = "FILE", conflicts_with = "changes", required_unless_present = "changes")]
        scenario: Option<PathBuf>,

        /// Change list applied to the baseline (JSON)
        #[arg(long, value_name = "FILE")]
        changes: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Rank parameters by their effect on climate change
    Sensitivity {
        /// Baseline calculation input (JSON)
        input_file: PathBuf,

        /// Sweep definition (JSON)
        #[arg(long, value_name = "FILE")]
        sweep: PathBuf,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Inspect and validate factor tables
    Factors {
        #[command(subcommand)]
        action: FactorsAction,
    },
}

#[derive(Subcommand)]
enum FactorsAction {
    /// Summarize the built-in factor tables
    List,
    /// Print one section of the built-in tables in full
    Explain {
        /// process_defaults, material_families, energy or characterization
        section: String,
    },
    /// Print the JSON schema with field descriptions and example
    Schema,
    /// Validate a custom factor table file
    Validate {
        /// Path to JSON factor table file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Calculate {
            input_file,
            data,
            verbose,
            advise,
        } => commands::calculate::run(&input_file, &data, verbose, advise),
        Commands::WhatIf {
            baseline,
            scenario,
            changes,
            data,
        } => commands::what_if::run(&baseline, scenario.as_deref(), changes.as_deref(), &data),
        Commands::Sensitivity {
            input_file,
            sweep,
            data,
        } => commands::sensitivity::run(&input_file, &sweep, &data),
        Commands::Factors { action } => match action {
            FactorsAction::List => commands::factors::list(),
            FactorsAction::Explain { section } => commands::factors::explain(&section),
            FactorsAction::Schema => commands::factors::schema(),
            FactorsAction::Validate { file } => commands::factors::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
