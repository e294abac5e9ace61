//! Install or upgrade configured components.

use anyhow::Context;
use std::collections::BTreeMap;

use super::Component;
use crate::assets::AssetLayout;
use crate::controlplane::{ComponentState, reconcile};
use crate::error::{LokoError, Result};
use crate::helm::{Chart, Release, ReleaseEngine};
use crate::output::Output;

/// Pick the components to apply.
///
/// No names selects every configured component; otherwise each name must be
/// a configured component.
pub fn components_to_apply<'a>(
    names: &[String],
    configured: &'a BTreeMap<String, Box<dyn Component>>,
) -> Result<Vec<(&'a str, &'a dyn Component)>> {
    if names.is_empty() {
        return Ok(configured
            .iter()
            .map(|(name, c)| (name.as_str(), c.as_ref()))
            .collect());
    }

    names
        .iter()
        .map(|name| match configured.get_key_value(name) {
            Some((name, c)) => Ok((name.as_str(), c.as_ref())),
            None => Err(LokoError::not_found(
                "configured component",
                name,
                configured.keys().cloned().collect(),
            )),
        })
        .collect()
}

pub struct ComponentApplier<'a> {
    releases: &'a dyn ReleaseEngine,
    layout: AssetLayout,
}

impl<'a> ComponentApplier<'a> {
    pub fn new(releases: &'a dyn ReleaseEngine, layout: AssetLayout) -> Self {
        Self { releases, layout }
    }

    /// Apply components in order; stops at the first failure.
    pub fn apply(
        &self,
        components: &[(&str, &dyn Component)],
    ) -> Result<Vec<(String, ComponentState)>> {
        let mut report = Vec::new();
        for (name, component) in components {
            Output::info(format!("Applying component '{name}'..."));
            let state = self
                .apply_one(name, *component)
                .map_err(|e| LokoError::engine(format!("applying component '{name}'"), e))?;
            Output::success(format!("Successfully applied component '{name}' configuration"));
            report.push((name.to_string(), state));
        }
        Ok(report)
    }

    fn apply_one(&self, name: &str, component: &dyn Component) -> anyhow::Result<ComponentState> {
        let chart = Chart::load(&self.layout.component_chart(name))
            .context("loading chart from assets failed")?;
        let values = component.values().context("rendering values failed")?;
        let release = Release::new(name, component.namespace());
        reconcile(self.releases, &release, &chart, &values)
    }
}
