//! Control plane update.
//!
//! After an apply to an existing cluster, the self-hosted control plane
//! releases are reconciled one at a time, in a fixed order, with atomic
//! install/upgrade so a failed release rolls back on its own. The first
//! failure stops the sequence.

use anyhow::{Context, anyhow};

use crate::assets::AssetLayout;
use crate::error::{LokoError, Result};
use crate::helm::{Chart, Release, ReleaseEngine};
use crate::output::Output;
use crate::terraform::ProvisioningEngine;

pub const NAMESPACE: &str = "kube-system";

const RELEASES: &[&str] = &["pod-checkpointer", "kube-apiserver", "kubernetes", "calico"];
const KUBELET: &str = "kubelet";

/// Releases to reconcile, in order.
pub fn control_plane_releases(upgrade_kubelets: bool) -> Vec<&'static str> {
    let mut releases = RELEASES.to_vec();
    if upgrade_kubelets {
        releases.push(KUBELET);
    }
    releases
}

/// Release state as observed during one pass. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Unknown,
    Missing,
    Installed,
    UpToDate,
}

/// Install the release if it is missing, upgrade it otherwise.
pub fn reconcile(
    engine: &dyn ReleaseEngine,
    release: &Release,
    chart: &Chart,
    values: &serde_yaml::Value,
) -> anyhow::Result<ComponentState> {
    let mut state = ComponentState::Unknown;
    tracing::debug!(release = %release.name, ?state, "reconciling release");

    state = if engine.release_exists(release)? {
        ComponentState::Installed
    } else {
        ComponentState::Missing
    };
    tracing::debug!(release = %release.name, ?state, "observed release state");

    match state {
        ComponentState::Missing => {
            Output::step(format!("'{}' is missing, installing...", release.name));
            engine.install(release, chart, values, true)?;
        }
        _ => {
            Output::step(format!("Ensuring '{}' is up to date...", release.name));
            engine.upgrade(release, chart, values, true)?;
        }
    }

    Ok(ComponentState::UpToDate)
}

/// Parse a `<name>_values` engine output into chart values.
pub fn parse_values(raw: serde_json::Value) -> anyhow::Result<serde_yaml::Value> {
    match raw {
        serde_json::Value::String(text) => {
            serde_yaml::from_str(&text).context("Failed to parse values.yaml")
        }
        serde_json::Value::Null => Err(anyhow!("values output is empty")),
        other => serde_yaml::to_value(other).context("Failed to convert values"),
    }
}

pub struct ControlPlaneUpdater<'a> {
    provisioning: &'a dyn ProvisioningEngine,
    releases: &'a dyn ReleaseEngine,
    layout: AssetLayout,
}

impl<'a> ControlPlaneUpdater<'a> {
    pub fn new(
        provisioning: &'a dyn ProvisioningEngine,
        releases: &'a dyn ReleaseEngine,
        layout: AssetLayout,
    ) -> Self {
        Self {
            provisioning,
            releases,
            layout,
        }
    }

    /// Reconcile every control plane release; stops at the first failure.
    pub fn update(&self, upgrade_kubelets: bool) -> Result<Vec<(String, ComponentState)>> {
        let mut report = Vec::new();
        for name in control_plane_releases(upgrade_kubelets) {
            let state = self.update_one(name).map_err(|e| {
                LokoError::engine(format!("updating control plane component '{name}'"), e)
            })?;
            report.push((name.to_string(), state));
        }
        Ok(report)
    }

    fn update_one(&self, name: &str) -> anyhow::Result<ComponentState> {
        let chart = Chart::load(&self.layout.control_plane_chart(name))
            .context("loading chart from assets failed")?;

        let raw = self
            .provisioning
            .output(&format!("{name}_values"))
            .context("reading values from terraform failed")?;
        let values = parse_values(raw)?;

        reconcile(self.releases, &Release::new(name, NAMESPACE), &chart, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::bail;

    use crate::terraform::RenderedConfig;

    struct ValuesOutput;

    impl ProvisioningEngine for ValuesOutput {
        fn initialize(&mut self, _: &Path, _: &RenderedConfig) -> anyhow::Result<()> {
            Ok(())
        }

        fn plan(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn apply(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn execute(&self, _: &[String]) -> anyhow::Result<()> {
            Ok(())
        }

        fn destroy(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn output(&self, name: &str) -> anyhow::Result<serde_json::Value> {
            Ok(serde_json::json!(format!("output: {name}\n")))
        }
    }

    /// Only `pod-checkpointer` exists; installing anything fails.
    struct BrokenInstall {
        calls: Mutex<Vec<String>>,
    }

    impl ReleaseEngine for BrokenInstall {
        fn release_exists(&self, release: &Release) -> anyhow::Result<bool> {
            Ok(release.name == "pod-checkpointer")
        }

        fn install(
            &self,
            release: &Release,
            _chart: &Chart,
            _values: &serde_yaml::Value,
            atomic: bool,
        ) -> anyhow::Result<()> {
            assert!(atomic);
            self.calls.lock().unwrap().push(format!("install {}", release.name));
            bail!("INSTALLATION FAILED: cannot re-use a name that is still in use")
        }

        fn upgrade(
            &self,
            release: &Release,
            _chart: &Chart,
            values: &serde_yaml::Value,
            atomic: bool,
        ) -> anyhow::Result<()> {
            assert!(atomic);
            assert_eq!(values["output"], serde_yaml::Value::from("pod-checkpointer_values"));
            self.calls.lock().unwrap().push(format!("upgrade {}", release.name));
            Ok(())
        }
    }

    fn write_charts(layout: &AssetLayout) {
        for name in control_plane_releases(true) {
            let dir = layout.control_plane_chart(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join("Chart.yaml"),
                format!("name: {name}\nversion: 0.1.0\n"),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_install_failure_stops_update() {
        let temp = tempfile::tempdir().unwrap();
        let layout = AssetLayout::new(temp.path());
        write_charts(&layout);

        let helm = BrokenInstall {
            calls: Mutex::new(Vec::new()),
        };
        let err = ControlPlaneUpdater::new(&ValuesOutput, &helm, layout)
            .update(false)
            .unwrap_err();

        match err {
            LokoError::Engine { phase, message } => {
                assert_eq!(phase, "updating control plane component 'kube-apiserver'");
                assert!(message.contains("INSTALLATION FAILED"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            *helm.calls.lock().unwrap(),
            vec!["upgrade pod-checkpointer", "install kube-apiserver"]
        );
    }

    #[test]
    fn test_release_order() {
        assert_eq!(
            control_plane_releases(false),
            vec!["pod-checkpointer", "kube-apiserver", "kubernetes", "calico"]
        );
        assert_eq!(control_plane_releases(true).last(), Some(&"kubelet"));
    }

    #[test]
    fn test_parse_values() {
        let values = parse_values(serde_json::json!("replicas: 2\n")).unwrap();
        assert_eq!(values["replicas"], serde_yaml::Value::from(2));

        let values = parse_values(serde_json::json!({"mtu": 1480})).unwrap();
        assert_eq!(values["mtu"], serde_yaml::Value::from(1480));

        assert!(parse_values(serde_json::Value::Null).is_err());
        assert!(parse_values(serde_json::json!("a: [")).is_err());
    }
}
