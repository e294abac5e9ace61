//! Contour ingress controller.

use serde::{Deserialize, Serialize};

use super::Component;
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

const NAMESPACE: &str = "projectcontour";
const INSTALL_MODES: &[&str] = &["deployment", "daemonset"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    install_mode: Option<String>,
    service_monitor: bool,
    envoy_replicas: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Values<'a> {
    envoy: EnvoyValues<'a>,
    monitoring: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvoyValues<'a> {
    service_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    replicas: Option<u32>,
    daemonset: bool,
}

#[derive(Debug, Default)]
pub struct Contour {
    config: Config,
}

pub fn new() -> Box<dyn Component> {
    Box::new(Contour::default())
}

impl Extension for Contour {
    fn name(&self) -> &'static str {
        "contour"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match self.config.install_mode.as_deref() {
            None => diags.error(
                "install_mode is required",
                format!("Set install_mode to one of: {}", INSTALL_MODES.join(", ")),
            ),
            Some(mode) if !INSTALL_MODES.contains(&mode) => diags.error(
                "Invalid install_mode",
                format!("{mode:?} must be one of: {}", INSTALL_MODES.join(", ")),
            ),
            Some(_) => {}
        }

        if self.config.install_mode.as_deref() == Some("daemonset")
            && self.config.envoy_replicas.is_some()
        {
            diags.error(
                "envoy_replicas conflicts with install_mode daemonset",
                "A daemonset runs one Envoy per node",
            );
        }
        diags
    }
}

impl Component for Contour {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn values(&self) -> anyhow::Result<serde_yaml::Value> {
        let daemonset = self.config.install_mode.as_deref() == Some("daemonset");
        let values = Values {
            envoy: EnvoyValues {
                service_type: "NodePort",
                replicas: self.config.envoy_replicas,
                daemonset,
            },
            monitoring: self.config.service_monitor,
        };
        Ok(serde_yaml::to_value(values)?)
    }
}
