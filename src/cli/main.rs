//! CLI binary entry point for case-warehouse

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use case_warehouse::cli::commands::init::handle_init;
#[cfg(feature = "cli")]
use case_warehouse::cli::commands::run::{RunArgs, handle_infer, handle_run};
#[cfg(feature = "cli")]
use case_warehouse::cli::commands::summarize::handle_summarize;
#[cfg(feature = "cli")]
use case_warehouse::cli::commands::DEFAULT_PATTERN;
#[cfg(feature = "cli")]
use case_warehouse::inference::DEFAULT_MAX_NODES;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "case-warehouse")]
#[command(about = "Turn clinical case documents into a typed star schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InputArgs {
    /// Document files or directories to search
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "warehouse")]
    output: PathBuf,
    /// Configuration file (defaults to ./.case-warehouse.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Glob pattern used inside input directories
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,
    /// Infer the mapping locally even when an LLM key is configured
    #[arg(long)]
    local: bool,
}

#[cfg(feature = "cli")]
impl From<InputArgs> for RunArgs {
    fn from(args: InputArgs) -> Self {
        RunArgs {
            inputs: args.inputs,
            output: args.output,
            config: args.config,
            pattern: args.pattern,
            local: args.local,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write mapping, rows and star tables
    Run(InputArgs),
    /// Synthesize the mapping only
    Infer(InputArgs),
    /// Print the tag structure of one document
    Summarize {
        /// Document file
        input: PathBuf,
        /// Node-visit budget
        #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
        max_nodes: usize,
    },
    /// Write a sample configuration file
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => handle_run(&args.into()).context("pipeline run failed"),
        Commands::Infer(args) => handle_infer(&args.into()).context("mapping inference failed"),
        Commands::Summarize { input, max_nodes } => handle_summarize(&input, max_nodes)
            .with_context(|| format!("cannot summarize {}", input.display())),
        Commands::Init { dir, force } => handle_init(&dir, force).context("init failed"),
    }
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
