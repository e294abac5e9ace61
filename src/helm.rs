//! Release engine interface and its Helm CLI adapter.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command_runner::{CommandOptions, CommandRunner, failure_message};

/// A chart directory from the asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct ChartFile {
    name: Option<String>,
    version: Option<String>,
}

impl Chart {
    /// Load and validate the chart in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest = dir.join("Chart.yaml");
        let content = fs::read_to_string(&manifest)
            .with_context(|| format!("Failed to read {}", manifest.display()))?;
        let file: ChartFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", manifest.display()))?;

        let name = file.name.filter(|n| !n.is_empty());
        let version = file.version.filter(|v| !v.is_empty());
        let (Some(name), Some(version)) = (name, version) else {
            bail!("chart is invalid: {} must set name and version", manifest.display());
        };

        Ok(Self {
            name,
            version,
            path: dir.to_path_buf(),
        })
    }
}

/// A named release in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub namespace: String,
}

impl Release {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// External release engine.
pub trait ReleaseEngine: Send + Sync {
    fn release_exists(&self, release: &Release) -> Result<bool>;

    fn install(
        &self,
        release: &Release,
        chart: &Chart,
        values: &serde_yaml::Value,
        atomic: bool,
    ) -> Result<()>;

    fn upgrade(
        &self,
        release: &Release,
        chart: &Chart,
        values: &serde_yaml::Value,
        atomic: bool,
    ) -> Result<()>;
}

/// Drives the `helm` binary against one cluster.
pub struct HelmCli {
    runner: Arc<dyn CommandRunner>,
    kubeconfig: PathBuf,
}

impl HelmCli {
    pub fn new(runner: Arc<dyn CommandRunner>, kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            kubeconfig: kubeconfig.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let output = self
            .runner
            .run_output("helm", args, &CommandOptions::default())?;
        if !output.status.success() {
            bail!("'helm {}' failed: {}", args[0], failure_message(&output));
        }
        Ok(())
    }

    fn deploy(
        &self,
        action: &str,
        release: &Release,
        chart: &Chart,
        values: &serde_yaml::Value,
        atomic: bool,
    ) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("lokoctl-values-")
            .suffix(".yaml")
            .tempfile()
            .context("Failed to create values file")?;
        let rendered = serde_yaml::to_string(values).context("Failed to serialize values")?;
        file.write_all(rendered.as_bytes())
            .context("Failed to write values file")?;

        let chart_path = chart.path.to_string_lossy();
        let values_path = file.path().to_string_lossy();
        let kubeconfig = self.kubeconfig.to_string_lossy();

        let mut args = vec![
            action,
            release.name.as_str(),
            &*chart_path,
            "--namespace",
            release.namespace.as_str(),
            "--kubeconfig",
            &*kubeconfig,
            "--values",
            &*values_path,
        ];
        if action == "install" {
            args.push("--create-namespace");
        }
        if atomic {
            args.push("--atomic");
        }

        tracing::info!(
            release = %release.name,
            namespace = %release.namespace,
            action,
            "running helm"
        );
        self.run(&args)
    }
}

impl ReleaseEngine for HelmCli {
    fn release_exists(&self, release: &Release) -> Result<bool> {
        let kubeconfig = self.kubeconfig.to_string_lossy();
        let args = [
            "status",
            release.name.as_str(),
            "--namespace",
            release.namespace.as_str(),
            "--kubeconfig",
            &*kubeconfig,
        ];
        let output = self
            .runner
            .run_output("helm", &args, &CommandOptions::default())?;
        if output.status.success() {
            return Ok(true);
        }

        let message = failure_message(&output);
        if message.contains("not found") {
            return Ok(false);
        }
        bail!("'helm status {}' failed: {message}", release.name)
    }

    fn install(
        &self,
        release: &Release,
        chart: &Chart,
        values: &serde_yaml::Value,
        atomic: bool,
    ) -> Result<()> {
        self.deploy("install", release, chart, values, atomic)
    }

    fn upgrade(
        &self,
        release: &Release,
        chart: &Chart,
        values: &serde_yaml::Value,
        atomic: bool,
    ) -> Result<()> {
        self.deploy("upgrade", release, chart, values, atomic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::testing::{RecordingRunner, Response};

    fn chart_dir(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Chart.yaml"), content).unwrap();
        dir
    }

    #[test]
    fn test_load_chart() {
        let dir = chart_dir("apiVersion: v2\nname: calico\nversion: 0.1.0\n");
        let chart = Chart::load(dir.path()).unwrap();
        assert_eq!(chart.name, "calico");
        assert_eq!(chart.version, "0.1.0");
    }

    #[test]
    fn test_load_chart_requires_version() {
        let dir = chart_dir("apiVersion: v2\nname: calico\n");
        let err = Chart::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("chart is invalid"));
    }

    #[test]
    fn test_load_missing_chart() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Chart::load(dir.path()).is_err());
    }

    #[test]
    fn test_release_exists() {
        let runner = Arc::new(RecordingRunner::new());
        runner.respond("status calico", Response::ok("STATUS: deployed"));
        runner.respond("status kubelet", Response::fail("Error: release: not found"));
        runner.respond("status broken", Response::fail("Error: cluster unreachable"));
        let helm = HelmCli::new(runner.clone(), "/tmp/kubeconfig");

        assert!(helm.release_exists(&Release::new("calico", "kube-system")).unwrap());
        assert!(!helm.release_exists(&Release::new("kubelet", "kube-system")).unwrap());
        assert!(helm.release_exists(&Release::new("broken", "kube-system")).is_err());

        assert!(runner.lines()[0].contains("--namespace kube-system --kubeconfig /tmp/kubeconfig"));
    }

    #[test]
    fn test_install_arguments() {
        let dir = chart_dir("name: calico\nversion: 0.1.0\n");
        let chart = Chart::load(dir.path()).unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let helm = HelmCli::new(runner.clone(), "/tmp/kubeconfig");
        let values: serde_yaml::Value = serde_yaml::from_str("mtu: 1480").unwrap();

        helm.install(&Release::new("calico", "kube-system"), &chart, &values, true)
            .unwrap();
        helm.upgrade(&Release::new("calico", "kube-system"), &chart, &values, true)
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].args[0], "install");
        assert!(calls[0].args.contains(&"--create-namespace".to_string()));
        assert!(calls[0].args.contains(&"--atomic".to_string()));
        assert_eq!(calls[1].args[0], "upgrade");
        assert!(!calls[1].args.contains(&"--create-namespace".to_string()));
    }

    #[test]
    fn test_failed_upgrade_reports_stderr() {
        let dir = chart_dir("name: calico\nversion: 0.1.0\n");
        let chart = Chart::load(dir.path()).unwrap();
        let runner = Arc::new(RecordingRunner::new());
        runner.respond("upgrade", Response::fail("UPGRADE FAILED: timed out"));
        let helm = HelmCli::new(runner, "/tmp/kubeconfig");

        let err = helm
            .upgrade(
                &Release::new("calico", "kube-system"),
                &chart,
                &serde_yaml::Value::Null,
                true,
            )
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
