//! `lokoctl cluster` - apply or destroy the cluster described by the
//! configuration document.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::sync::Arc;

use crate::apply::{ApplyOptions, ApplyOutcome, Engines, run_apply, run_destroy};
use crate::command_runner::{CommandRunner, RealCommandRunner};
use crate::config::ClusterDocument;
use crate::controlplane::ComponentState;
use crate::descriptor::ClusterDescriptor;
use crate::helm::HelmCli;
use crate::output::Output;
use crate::pipeline::ExecutionPlan;
use crate::prompt::InteractivePrompter;
use crate::registry::ExtensionRegistry;
use crate::resolve::resolve;
use crate::terraform::TerraformExecutor;
use crate::verify::KubectlVerifier;

#[derive(Debug, Args)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub action: ClusterAction,
}

#[derive(Debug, Subcommand)]
pub enum ClusterAction {
    /// Deploy or update a cluster
    Apply(ClusterApplyArgs),
    /// Destroy a cluster
    Destroy,
}

#[derive(Debug, Args)]
pub struct ClusterApplyArgs {
    /// Skip applying the configured components
    #[arg(long)]
    pub skip_components: bool,

    /// Include the kubelet in the control plane update
    #[arg(long)]
    pub upgrade_kubelets: bool,
}

/// Load and resolve the configuration document named by the plan.
pub fn load_descriptor(plan: &ExecutionPlan) -> Result<ClusterDescriptor> {
    let doc = ClusterDocument::load(&plan.config)
        .with_context(|| format!("Failed to load {}", plan.config.display()))?;
    let descriptor = resolve(&doc, &ExtensionRegistry::builtin())?;
    tracing::debug!(?descriptor, "configuration resolved");
    Ok(descriptor)
}

/// Engines backed by the `terraform`, `helm` and `kubectl` binaries.
pub fn real_engines(descriptor: &ClusterDescriptor, plan: &ExecutionPlan) -> Engines {
    let runner: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
    let kubeconfig = descriptor
        .layout()
        .resolve_kubeconfig(plan.kubeconfig.as_deref());

    Engines {
        provisioning: Box::new(TerraformExecutor::new(runner.clone(), plan.verbose)),
        releases: Box::new(HelmCli::new(runner.clone(), kubeconfig)),
        verifier: Box::new(KubectlVerifier::new(runner)),
        prompter: Box::new(InteractivePrompter),
    }
}

pub fn run(args: ClusterArgs, plan: &ExecutionPlan) -> Result<()> {
    let descriptor = load_descriptor(plan)?;
    let mut engines = real_engines(&descriptor, plan);

    match args.action {
        ClusterAction::Apply(apply_args) => apply(&descriptor, &mut engines, plan, &apply_args),
        ClusterAction::Destroy => destroy(&descriptor, &mut engines, plan),
    }
}

fn apply(
    descriptor: &ClusterDescriptor,
    engines: &mut Engines,
    plan: &ExecutionPlan,
    args: &ClusterApplyArgs,
) -> Result<()> {
    let options = ApplyOptions {
        confirm: plan.confirm,
        skip_components: args.skip_components,
        upgrade_kubelets: args.upgrade_kubelets,
        kubeconfig: plan.kubeconfig.clone(),
    };

    Output::header(format!(
        "Applying cluster '{}' on {}",
        descriptor.platform.cluster_name(),
        descriptor.platform.name()
    ));
    let report = run_apply(descriptor, engines, &options)?;

    if report.outcome == ApplyOutcome::Cancelled {
        return Ok(());
    }

    Output::blank();
    for (name, state) in report.control_plane.iter().chain(&report.components) {
        let status = match state {
            ComponentState::UpToDate => "up to date",
            ComponentState::Installed => "installed",
            ComponentState::Missing => "missing",
            ComponentState::Unknown => "unknown",
        };
        Output::kv(name, status);
    }

    let kubeconfig = descriptor
        .layout()
        .resolve_kubeconfig(plan.kubeconfig.as_deref());
    Output::success("Your lokomotive cluster is ready");
    Output::hint(format!(
        "Now run: export KUBECONFIG={}",
        kubeconfig.display()
    ));
    Ok(())
}

fn destroy(
    descriptor: &ClusterDescriptor,
    engines: &mut Engines,
    plan: &ExecutionPlan,
) -> Result<()> {
    Output::header(format!(
        "Destroying cluster '{}'",
        descriptor.platform.cluster_name()
    ));
    let outcome = run_destroy(descriptor, engines, plan.confirm)?;
    tracing::debug!(?outcome, "destroy finished");
    Ok(())
}
