//! `lokoctl component` - manage add-on components of a running cluster.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::sync::Arc;

use super::cluster::load_descriptor;
use crate::command_runner::RealCommandRunner;
use crate::components::apply::{ComponentApplier, components_to_apply};
use crate::helm::HelmCli;
use crate::output::Output;
use crate::pipeline::ExecutionPlan;

#[derive(Debug, Args)]
pub struct ComponentArgs {
    #[command(subcommand)]
    pub action: ComponentAction,
}

#[derive(Debug, Subcommand)]
pub enum ComponentAction {
    /// Install or upgrade components
    ///
    /// Without names every configured component is applied.
    Apply {
        /// Components to apply
        names: Vec<String>,
    },
}

pub fn run(args: ComponentArgs, plan: &ExecutionPlan) -> Result<()> {
    match args.action {
        ComponentAction::Apply { names } => apply(&names, plan),
    }
}

fn apply(names: &[String], plan: &ExecutionPlan) -> Result<()> {
    let descriptor = load_descriptor(plan)?;
    let selected = components_to_apply(names, &descriptor.components)?;
    if selected.is_empty() {
        Output::info("No components configured");
        return Ok(());
    }

    let kubeconfig = descriptor
        .layout()
        .resolve_kubeconfig(plan.kubeconfig.as_deref());
    let helm = HelmCli::new(Arc::new(RealCommandRunner), kubeconfig);

    ComponentApplier::new(&helm, descriptor.layout()).apply(&selected)?;
    Ok(())
}
