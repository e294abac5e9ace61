use serde::Deserialize;

use super::{
    DEFAULT_DOMAIN_SUFFIX, DEFAULT_MTU, DEFAULT_POD_CIDR, DEFAULT_SERVICE_CIDR, Network,
    NetworkSettings, check_cidr,
};
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    network_mtu: u32,
    pod_cidr: String,
    service_cidr: String,
    cluster_domain_suffix: String,
    enable_reporting: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_mtu: DEFAULT_MTU,
            pod_cidr: DEFAULT_POD_CIDR.to_string(),
            service_cidr: DEFAULT_SERVICE_CIDR.to_string(),
            cluster_domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_string(),
            enable_reporting: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct BareMetalNetwork {
    config: Config,
}

pub fn new() -> Box<dyn Network> {
    Box::new(BareMetalNetwork::default())
}

impl Extension for BareMetalNetwork {
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
        let mut diags = Diagnostics::new();
        check_cidr(&mut diags, "pod CIDR", &self.config.pod_cidr);
        check_cidr(&mut diags, "service CIDR", &self.config.service_cidr);
        diags
    }
}

impl Network for BareMetalNetwork {
    fn settings(&self) -> NetworkSettings {
        let c = &self.config;
        NetworkSettings {
            network_mtu: c.network_mtu,
            pod_cidr: c.pod_cidr.clone(),
            service_cidr: c.service_cidr.clone(),
            cluster_domain_suffix: c.cluster_domain_suffix.clone(),
            enable_reporting: c.enable_reporting,
            management_cidrs: Vec::new(),
            node_private_cidr: None,
        }
    }
}
