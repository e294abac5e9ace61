//! Provisioning engine interface and its Terraform CLI adapter.
//!
//! The orchestrator only sees [`ProvisioningEngine`]. [`TerraformExecutor`]
//! writes the rendered backend and cluster configuration into the Terraform
//! root directory and shells out to `terraform` through a [`CommandRunner`].

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command_runner::{CommandOptions, CommandRunner, failure_message};
use crate::output::Output;

pub const BACKEND_FILE: &str = "backend.tf";
pub const CLUSTER_FILE: &str = "cluster.tf";

/// Rendered engine input: backend block and cluster configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedConfig {
    pub backend: String,
    pub cluster: String,
}

/// External provisioning engine.
pub trait ProvisioningEngine: Send + Sync {
    /// Write the rendered configuration into `work_dir` and prepare the engine.
    fn initialize(&mut self, work_dir: &Path, rendered: &RenderedConfig) -> Result<()>;

    /// Show pending changes without applying them.
    fn plan(&self) -> Result<()>;

    /// Apply everything.
    fn apply(&self) -> Result<()>;

    /// Run the engine with arbitrary arguments (targeted applies).
    fn execute(&self, args: &[String]) -> Result<()>;

    /// Destroy everything.
    fn destroy(&self) -> Result<()>;

    /// Read an output value; an empty name returns all outputs as an object.
    fn output(&self, name: &str) -> Result<serde_json::Value>;
}

/// Drives the `terraform` binary.
pub struct TerraformExecutor {
    runner: Arc<dyn CommandRunner>,
    work_dir: Option<PathBuf>,
    verbose: bool,
}

impl TerraformExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, verbose: bool) -> Self {
        Self {
            runner,
            work_dir: None,
            verbose,
        }
    }

    fn options(&self) -> Result<CommandOptions> {
        let Some(dir) = &self.work_dir else {
            bail!("terraform has not been initialized");
        };
        Ok(CommandOptions::with_cwd(dir).env("TF_IN_AUTOMATION", "1"))
    }

    /// Run a terraform subcommand. In verbose mode the engine's output is
    /// streamed to the terminal; otherwise it is captured and only shown on
    /// failure.
    fn run(&self, args: &[&str]) -> Result<()> {
        let options = self.options()?;
        let line = format!("terraform {}", args.join(" "));
        tracing::info!(command = %line, "running terraform");

        if self.verbose {
            Output::running(&line);
            let status = self.runner.run_status("terraform", args, &options)?;
            if !status.success() {
                bail!("'{line}' exited with {status}");
            }
            return Ok(());
        }

        let output = self.runner.run_output("terraform", args, &options)?;
        if !output.status.success() {
            bail!("'{line}' failed: {}", failure_message(&output));
        }
        Ok(())
    }
}

impl ProvisioningEngine for TerraformExecutor {
    fn initialize(&mut self, work_dir: &Path, rendered: &RenderedConfig) -> Result<()> {
        fs::create_dir_all(work_dir)
            .with_context(|| format!("Failed to create {}", work_dir.display()))?;

        let backend_path = work_dir.join(BACKEND_FILE);
        fs::write(&backend_path, &rendered.backend)
            .with_context(|| format!("Failed to write {}", backend_path.display()))?;

        let cluster_path = work_dir.join(CLUSTER_FILE);
        fs::write(&cluster_path, &rendered.cluster)
            .with_context(|| format!("Failed to write {}", cluster_path.display()))?;

        self.work_dir = Some(work_dir.to_path_buf());
        self.run(&["init", "-input=false"])
    }

    fn plan(&self) -> Result<()> {
        // The plan is meant for the operator, so it is always shown.
        let options = self.options()?;
        let status = self
            .runner
            .run_status("terraform", &["plan", "-input=false"], &options)?;
        if !status.success() {
            bail!("'terraform plan' exited with {status}");
        }
        Ok(())
    }

    fn apply(&self) -> Result<()> {
        self.run(&["apply", "-auto-approve", "-input=false"])
    }

    fn execute(&self, args: &[String]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args)
    }

    fn destroy(&self) -> Result<()> {
        self.run(&["destroy", "-auto-approve", "-input=false"])
    }

    fn output(&self, name: &str) -> Result<serde_json::Value> {
        let options = self.options()?;
        let mut args = vec!["output", "-json"];
        if !name.is_empty() {
            args.push(name);
        }

        let output = self.runner.run_output("terraform", &args, &options)?;
        if !output.status.success() {
            bail!(
                "'terraform {}' failed: {}",
                args.join(" "),
                failure_message(&output)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&stdout)
            .with_context(|| format!("Failed to parse terraform output {name:?}"))
    }
}
