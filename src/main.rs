use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lokoctl::commands;
use lokoctl::output::Output;
use lokoctl::pipeline;
use lokoctl::{Cli, Commands};

fn run(cli: Cli) -> Result<()> {
    let plan = pipeline::ExecutionPlan::from_cli(&cli);
    tracing::debug!(
        config = %plan.config.display(),
        confirm = plan.confirm,
        verbose = plan.verbose,
        "Execution plan created"
    );

    match cli.command {
        Commands::Cluster(args) => commands::cluster::run(args, &plan),
        Commands::Component(args) => commands::component::run(args, &plan),
        Commands::Extensions(args) => commands::extensions::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    // Initialize tracing with RUST_LOG env filter
    // e.g., RUST_LOG=lokoctl=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        Output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}
