//! cert-manager, issuing certificates through ACME.

use serde::{Deserialize, Serialize};

use super::Component;
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    email: String,
    namespace: String,
    webhooks: bool,
    service_monitor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: String::new(),
            namespace: "cert-manager".to_string(),
            webhooks: true,
            service_monitor: false,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Values<'a> {
    email: &'a str,
    webhook: Toggle,
    service_monitor: Toggle,
}

#[derive(Serialize)]
struct Toggle {
    enabled: bool,
}

#[derive(Debug, Default)]
pub struct CertManager {
    config: Config,
}

pub fn new() -> Box<dyn Component> {
    Box::new(CertManager::default())
}

impl Extension for CertManager {
    fn name(&self) -> &'static str {
        "cert-manager"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if self.config.email.is_empty() {
            diags.error("email is required", "cert-manager registers an ACME account with it");
        } else if !self.config.email.contains('@') {
            diags.error(
                "Invalid email",
                format!("{:?} is not an email address", self.config.email),
            );
        }
        if self.config.namespace.is_empty() {
            diags.error("namespace must not be empty", "");
        }
        diags
    }
}

impl Component for CertManager {
    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    fn values(&self) -> anyhow::Result<serde_yaml::Value> {
        let values = Values {
            email: &self.config.email,
            webhook: Toggle {
                enabled: self.config.webhooks,
            },
            service_monitor: Toggle {
                enabled: self.config.service_monitor,
            },
        };
        Ok(serde_yaml::to_value(values)?)
    }
}
