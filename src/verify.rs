//! Post-apply cluster readiness check.

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::command_runner::{CommandOptions, CommandRunner, failure_message};
use crate::error::{LokoError, Result};
use crate::output::Output;

/// What the verifier needs to know about the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHandle {
    pub kubeconfig: PathBuf,
    pub expected_nodes: usize,
}

pub trait ClusterVerifier: Send + Sync {
    /// Succeeds once the cluster is ready; otherwise [`LokoError::Verification`].
    fn verify(&self, cluster: &ClusterHandle) -> Result<()>;
}

#[derive(Deserialize)]
struct NodeList {
    items: Vec<Node>,
}

#[derive(Deserialize)]
struct Node {
    #[serde(default)]
    status: NodeStatus,
}

#[derive(Default, Deserialize)]
struct NodeStatus {
    #[serde(default)]
    conditions: Vec<NodeCondition>,
}

#[derive(Deserialize)]
struct NodeCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

/// Count the nodes whose `Ready` condition is `True`.
fn ready_nodes(json: &str) -> anyhow::Result<usize> {
    let list: NodeList = serde_json::from_str(json).context("Failed to parse node list")?;
    Ok(list
        .items
        .iter()
        .filter(|node| {
            node.status
                .conditions
                .iter()
                .any(|c| c.kind == "Ready" && c.status == "True")
        })
        .count())
}

/// Polls `kubectl get nodes` until the expected number of nodes is ready.
pub struct KubectlVerifier {
    runner: Arc<dyn CommandRunner>,
    attempts: u32,
    interval: Duration,
}

impl KubectlVerifier {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            attempts: 60,
            interval: Duration::from_secs(10),
        }
    }

    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.interval = interval;
        self
    }

    fn count_ready(&self, cluster: &ClusterHandle) -> anyhow::Result<usize> {
        let kubeconfig = cluster.kubeconfig.to_string_lossy();
        let output = self.runner.run_output(
            "kubectl",
            &["get", "nodes", "-o", "json", "--kubeconfig", &*kubeconfig],
            &CommandOptions::default(),
        )?;
        if !output.status.success() {
            bail!("'kubectl get nodes' failed: {}", failure_message(&output));
        }
        ready_nodes(&String::from_utf8_lossy(&output.stdout))
    }
}

impl ClusterVerifier for KubectlVerifier {
    fn verify(&self, cluster: &ClusterHandle) -> Result<()> {
        let spinner = Output::spinner(format!(
            "Waiting for {} nodes to become ready...",
            cluster.expected_nodes
        ));

        let mut last = String::from("no attempt made");
        for attempt in 1..=self.attempts {
            match self.count_ready(cluster) {
                Ok(ready) if ready >= cluster.expected_nodes => {
                    spinner.finish_success(format!("{ready} nodes ready"));
                    return Ok(());
                }
                Ok(ready) => {
                    last = format!("{ready} of {} nodes ready", cluster.expected_nodes);
                    spinner.set_message(format!("Waiting for nodes: {last}"));
                }
                Err(e) => last = format!("{e:#}"),
            }
            tracing::debug!(attempt, status = %last, "cluster not ready yet");
            if attempt < self.attempts {
                std::thread::sleep(self.interval);
            }
        }

        spinner.finish_error("Cluster did not become ready");
        Err(LokoError::Verification(last))
    }
}
