//! Cluster lifecycle: render, apply, verify, update, destroy.
//!
//! [`Orchestrator`] drives the provisioning engine through
//! `Uninitialized → Initialized → Applied`. When the cluster already exists
//! and its DNS is managed by hand, the apply is staged: the DNS entries and
//! worker nodes are created first, the operator publishes the records, and
//! only then is the rest of the configuration applied.
//!
//! [`run_apply`] and [`run_destroy`] chain the orchestrator with the
//! verifier, the control plane updater and the component applier.

use std::path::PathBuf;

use crate::components::apply::{ComponentApplier, components_to_apply};
use crate::controlplane::{ComponentState, ControlPlaneUpdater};
use crate::descriptor::ClusterDescriptor;
use crate::dns::{self, DnsMode};
use crate::error::{LokoError, Result};
use crate::helm::ReleaseEngine;
use crate::output::Output;
use crate::prompt::Prompter;
use crate::terraform::ProvisioningEngine;
use crate::verify::ClusterVerifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    Uninitialized,
    Initialized,
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Infrastructure applied; `existed` is whether the cluster was there before.
    Applied { existed: bool },
    /// The operator declined the plan.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    /// Nothing was provisioned; the engine was not asked to destroy.
    AlreadyDestroyed,
    Cancelled,
}

pub struct Orchestrator<'a> {
    descriptor: &'a ClusterDescriptor,
    engine: &'a mut dyn ProvisioningEngine,
    prompter: &'a dyn Prompter,
    state: ApplyState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        descriptor: &'a ClusterDescriptor,
        engine: &'a mut dyn ProvisioningEngine,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            descriptor,
            engine,
            prompter,
            state: ApplyState::Uninitialized,
        }
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    /// Render the configuration into the engine's working directory and
    /// prepare the engine. Safe to repeat.
    pub fn initialize(&mut self) -> Result<()> {
        self.descriptor
            .platform
            .preflight()
            .map_err(|e| LokoError::ConfigurationIncomplete(format!("{e:#}")))?;

        let rendered = self.descriptor.render()?;
        let work_dir = self.descriptor.layout().terraform_dir();
        tracing::debug!(dir = %work_dir.display(), "initializing terraform");

        self.engine
            .initialize(&work_dir, &rendered)
            .map_err(|e| LokoError::engine("terraform init", e))?;
        self.state = ApplyState::Initialized;
        Ok(())
    }

    /// A cluster exists when the engine reports any output at all.
    pub fn cluster_exists(&mut self) -> Result<bool> {
        self.ensure_initialized()?;
        let outputs = self
            .engine
            .output("")
            .map_err(|e| LokoError::engine("checking if cluster exists", e))?;

        let exists = match &outputs {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            _ => true,
        };
        tracing::debug!(exists, "cluster existence check");
        Ok(exists)
    }

    /// Apply the cluster configuration.
    ///
    /// Changes to an existing cluster are shown and confirmed first unless
    /// `confirm` is set.
    pub fn apply(&mut self, confirm: bool) -> Result<ApplyOutcome> {
        let existed = self.cluster_exists()?;

        if existed && !confirm {
            self.engine
                .plan()
                .map_err(|e| LokoError::engine("terraform plan", e))?;
            if !self.ask("Do you want to proceed with cluster apply?")? {
                Output::info("Cluster apply cancelled");
                return Ok(ApplyOutcome::Cancelled);
            }
        }

        // Re-render so the applied configuration matches the current document.
        self.initialize()?;

        if existed && self.descriptor.platform.dns_mode() == DnsMode::Manual {
            self.staged_apply()?;
        } else {
            self.full_apply()?;
        }

        self.state = ApplyState::Applied;
        Output::success("Your configurations are stored in the asset directory");
        Ok(ApplyOutcome::Applied { existed })
    }

    /// Destroy the cluster. A cluster that does not exist is left alone.
    pub fn destroy(&mut self, confirm: bool) -> Result<DestroyOutcome> {
        if !self.cluster_exists()? {
            Output::info("Cluster already destroyed, nothing to do");
            return Ok(DestroyOutcome::AlreadyDestroyed);
        }

        if !confirm
            && !self.ask(
                "WARNING: This action cannot be undone. Do you really want to destroy the cluster?",
            )?
        {
            Output::info("Cluster destroy cancelled");
            return Ok(DestroyOutcome::Cancelled);
        }

        self.initialize()?;
        self.engine
            .destroy()
            .map_err(|e| LokoError::engine("terraform destroy", e))?;
        self.state = ApplyState::Initialized;

        Output::success("Cluster destroyed successfully");
        Output::hint("You can safely remove the assets directory now");
        Ok(DestroyOutcome::Destroyed)
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.state == ApplyState::Uninitialized {
            self.initialize()?;
        }
        Ok(())
    }

    fn ask(&self, question: &str) -> Result<bool> {
        self.prompter
            .confirm(question)
            .map_err(|e| LokoError::engine("confirmation prompt", e))
    }

    fn full_apply(&self) -> Result<()> {
        Output::step("Applying cluster configuration...");
        self.engine
            .apply()
            .map_err(|e| LokoError::engine("terraform apply", e))
    }

    fn staged_apply(&self) -> Result<()> {
        let targets = self.descriptor.platform.staged_targets();
        tracing::info!(?targets, "creating DNS entries and worker nodes first");

        let mut args = vec![
            "apply".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
        ];
        args.extend(targets.iter().map(|t| format!("-target={t}")));

        Output::step("Creating DNS entries and worker nodes...");
        self.engine
            .execute(&args)
            .map_err(|e| LokoError::engine("terraform targeted apply", e))?;

        let Some(dns) = self.descriptor.platform.dns() else {
            return Err(LokoError::ConfigurationIncomplete(
                "manual DNS mode without DNS configuration".to_string(),
            ));
        };
        dns::ask_to_configure(&*self.engine, dns, self.prompter)?;

        self.full_apply()
    }
}

/// External engines used by a lifecycle run.
pub struct Engines {
    pub provisioning: Box<dyn ProvisioningEngine>,
    pub releases: Box<dyn ReleaseEngine>,
    pub verifier: Box<dyn ClusterVerifier>,
    pub prompter: Box<dyn Prompter>,
}

/// Options for [`run_apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub confirm: bool,
    pub skip_components: bool,
    pub upgrade_kubelets: bool,
    pub kubeconfig: Option<PathBuf>,
}

/// What a full apply run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcome: ApplyOutcome,
    pub control_plane: Vec<(String, ComponentState)>,
    pub components: Vec<(String, ComponentState)>,
}

/// Apply the infrastructure, verify the cluster, update the control plane
/// of an existing cluster, then apply the configured components.
pub fn run_apply(
    descriptor: &ClusterDescriptor,
    engines: &mut Engines,
    options: &ApplyOptions,
) -> Result<ApplyReport> {
    let outcome = Orchestrator::new(
        descriptor,
        &mut *engines.provisioning,
        &*engines.prompter,
    )
    .apply(options.confirm)?;

    let mut report = ApplyReport {
        outcome,
        control_plane: Vec::new(),
        components: Vec::new(),
    };
    let ApplyOutcome::Applied { existed } = outcome else {
        return Ok(report);
    };

    let handle = descriptor.cluster_handle(options.kubeconfig.as_deref());
    Output::step(format!(
        "Verifying cluster, expecting {} nodes...",
        handle.expected_nodes
    ));
    engines.verifier.verify(&handle)?;

    if existed {
        Output::header("Ensuring that cluster controlplane is up to date.");
        report.control_plane = ControlPlaneUpdater::new(
            &*engines.provisioning,
            &*engines.releases,
            descriptor.layout(),
        )
        .update(options.upgrade_kubelets)?;
    } else {
        tracing::debug!("new cluster, control plane installed by bootstrap");
    }

    if options.skip_components {
        tracing::debug!("skipping components");
        return Ok(report);
    }

    let selected = components_to_apply(&[], &descriptor.components)?;
    if !selected.is_empty() {
        report.components =
            ComponentApplier::new(&*engines.releases, descriptor.layout()).apply(&selected)?;
    }
    Ok(report)
}

/// Destroy the cluster described by `descriptor`.
pub fn run_destroy(
    descriptor: &ClusterDescriptor,
    engines: &mut Engines,
    confirm: bool,
) -> Result<DestroyOutcome> {
    Orchestrator::new(
        descriptor,
        &mut *engines.provisioning,
        &*engines.prompter,
    )
    .destroy(confirm)
}
