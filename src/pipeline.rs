//! Execution plan for a lokoctl command.
//!
//! Collects the global options that shape how a lifecycle command runs:
//! where the configuration lives, which kubeconfig to talk to, whether
//! prompts are skipped and whether engine output is streamed.

use std::path::PathBuf;

use crate::Cli;

pub const DEFAULT_CONFIG: &str = "cluster.yaml";

/// Execution plan for a lokoctl command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Cluster configuration document
    pub config: PathBuf,
    /// Explicit kubeconfig; the asset tree's kubeconfig otherwise
    pub kubeconfig: Option<PathBuf>,
    /// Skip interactive confirmations
    pub confirm: bool,
    /// Stream engine output to the terminal
    pub verbose: bool,
}

impl ExecutionPlan {
    /// Create an execution plan from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            kubeconfig: cli.kubeconfig.clone(),
            confirm: cli.confirm,
            verbose: cli.verbose,
        }
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            kubeconfig: None,
            confirm: false,
            verbose: false,
        }
    }
}

/// Builder for creating execution plans in tests or programmatically.
#[derive(Debug, Default)]
pub struct ExecutionPlanBuilder {
    config: Option<PathBuf>,
    kubeconfig: Option<PathBuf>,
    confirm: bool,
    verbose: bool,
}

impl ExecutionPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    pub fn kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    pub fn confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> ExecutionPlan {
        ExecutionPlan {
            config: self.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
            kubeconfig: self.kubeconfig,
            confirm: self.confirm,
            verbose: self.verbose,
        }
    }
}
