//! CLI argument definitions for lokoctl.
//!
//! Kept out of `main.rs` so that `pipeline::ExecutionPlan::from_cli` and
//! shell completion generation can reference these types.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::pipeline::DEFAULT_CONFIG;

#[derive(Debug, Parser)]
#[command(name = "lokoctl")]
#[command(about = "Lokomotive - provision and maintain Kubernetes clusters")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cluster configuration file
    #[arg(long, global = true, env = "LOKOCTL_CONFIG", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Kubeconfig to use instead of the one in the asset directory
    #[arg(long, global = true, env = "LOKOCTL_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub confirm: bool,

    /// Show output from Terraform
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage a cluster
    Cluster(commands::cluster::ClusterArgs),

    /// Manage components on a running cluster
    Component(commands::component::ComponentArgs),

    /// List available platforms, backends, networks, OS images and components
    #[command(alias = "ext")]
    Extensions(commands::extensions::ExtensionsArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
