//! gradebook CLI: build, check and apply final grade formulas.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Final grade formula engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a formula from component siglas
    Build {
        /// Component siglas (comma-separated, e.g. "P1,P2,T1")
        #[arg(long)]
        components: String,

        /// Average mode: simple or weighted
        #[arg(long, default_value = "simple")]
        mode: String,

        /// Weights for weighted mode (comma-separated, same order as components)
        #[arg(long)]
        weights: Option<String>,
    },

    /// Validate course TOML files
    Check {
        /// Path to course file or directory
        #[arg(long)]
        course: PathBuf,
    },

    /// Evaluate a formula against a single set of grades
    Preview {
        /// Formula to evaluate
        #[arg(long)]
        formula: String,

        /// Component grade as SIGLA=VALUE; leave VALUE empty for ungraded
        #[arg(long = "grade")]
        grades: Vec<String>,
    },

    /// Compute final grades for a course roster
    Roster {
        /// Path to course file
        #[arg(long)]
        course: PathBuf,

        /// Output format: table, csv, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Write output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Decimal separator for csv output: dot or comma
        #[arg(long)]
        decimal: Option<String>,

        /// Export even when some component grades are missing
        #[arg(long)]
        allow_incomplete: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example course
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradebook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            components,
            mode,
            weights,
        } => commands::build::execute(components, mode, weights),
        Commands::Check { course } => commands::check::execute(course),
        Commands::Preview { formula, grades } => commands::preview::execute(formula, grades),
        Commands::Roster {
            course,
            format,
            output,
            decimal,
            allow_incomplete,
            config,
        } => commands::roster::execute(course, format, output, decimal, allow_incomplete, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
