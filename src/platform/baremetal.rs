//! Bare-metal platform, provisioned through matchbox.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Platform, RenderContext};
use crate::assets::expand_home;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::extension::{Extension, decode_body};
use crate::flatcar::{DEFAULT_CHANNEL, DEFAULT_VERSION};
use crate::network::NetworkSettings;
use crate::template;

const TEMPLATE: &str = include_str!("../../templates/bare-metal.tf.j2");

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    cluster_name: String,
    asset_dir: String,
    ssh_pubkeys: Vec<String>,
    cached_install: bool,
    k8s_domain_name: String,
    matchbox_endpoint: String,
    matchbox_http_endpoint: String,
    matchbox_ca_path: String,
    matchbox_client_cert_path: String,
    matchbox_client_key_path: String,
    controller_names: Vec<String>,
    controller_macs: Vec<String>,
    controller_domains: Vec<String>,
    worker_names: Vec<String>,
    worker_macs: Vec<String>,
    worker_domains: Vec<String>,
    certs_validity_period_hours: Option<u32>,
}

#[derive(Debug, Default)]
pub struct BareMetal {
    config: Config,
}

pub fn new() -> Box<dyn Platform> {
    Box::new(BareMetal::default())
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    config: &'a Config,
    network: &'a NetworkSettings,
    os_channel: &'a str,
    os_version: &'a str,
}

/// Names, MACs and domains describe the same machines and must line up.
fn check_machines(
    diags: &mut Diagnostics,
    role: &str,
    names: &[String],
    macs: &[String],
    domains: &[String],
) {
    if names.len() != macs.len() || names.len() != domains.len() {
        diags.error(
            format!("Mismatched {role} machine lists"),
            format!(
                "{role}_names, {role}_macs and {role}_domains must have the same length \
                 (got {}, {} and {})",
                names.len(),
                macs.len(),
                domains.len()
            ),
        );
    }
}

impl Extension for BareMetal {
    fn name(&self) -> &'static str {
        "bare-metal"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let c = &self.config;
        let mut diags = Diagnostics::new();

        for (field, value) in [
            ("cluster_name", &c.cluster_name),
            ("asset_dir", &c.asset_dir),
            ("k8s_domain_name", &c.k8s_domain_name),
            ("matchbox_endpoint", &c.matchbox_endpoint),
            ("matchbox_http_endpoint", &c.matchbox_http_endpoint),
            ("matchbox_ca_path", &c.matchbox_ca_path),
            ("matchbox_client_cert_path", &c.matchbox_client_cert_path),
            ("matchbox_client_key_path", &c.matchbox_client_key_path),
        ] {
            if value.is_empty() {
                diags.error(
                    format!("{field} is required"),
                    format!("Set cluster.config.{field}"),
                );
            }
        }

        if c.controller_names.is_empty() {
            diags.error(
                "At least one controller is required",
                "Set cluster.config.controller_names",
            );
        }

        check_machines(
            &mut diags,
            "controller",
            &c.controller_names,
            &c.controller_macs,
            &c.controller_domains,
        );
        check_machines(
            &mut diags,
            "worker",
            &c.worker_names,
            &c.worker_macs,
            &c.worker_domains,
        );

        diags
    }
}

impl Platform for BareMetal {
    fn cluster_name(&self) -> &str {
        &self.config.cluster_name
    }

    fn asset_dir(&self) -> PathBuf {
        expand_home(&self.config.asset_dir)
    }

    fn expected_nodes(&self) -> usize {
        self.config.controller_names.len() + self.config.worker_names.len()
    }

    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let (os_channel, os_version) = match &ctx.os_image {
            Some(image) => (image.channel.as_str(), image.version.as_str()),
            None => (DEFAULT_CHANNEL, DEFAULT_VERSION),
        };

        let context = TemplateContext {
            config: &self.config,
            network: &ctx.network,
            os_channel,
            os_version,
        };
        template::render("bare-metal.tf", TEMPLATE, context)
    }
}
