//! Packet network: common settings plus management and node-private CIDRs.

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
    management_cidrs: Vec<String>,
    node_private_cidr: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_mtu: DEFAULT_MTU,
            pod_cidr: DEFAULT_POD_CIDR.to_string(),
            service_cidr: DEFAULT_SERVICE_CIDR.to_string(),
            cluster_domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_string(),
            enable_reporting: false,
            management_cidrs: Vec::new(),
            node_private_cidr: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PacketNetwork {
    config: Config,
}

pub fn new() -> Box<dyn Network> {
    Box::new(PacketNetwork::default())
}

impl Extension for PacketNetwork {
    fn name(&self) -> &'static str {
        "packet"
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
        if let Some(cidr) = &self.config.node_private_cidr {
            check_cidr(&mut diags, "node private CIDR", cidr);
        }
        for cidr in &self.config.management_cidrs {
            check_cidr(&mut diags, "management CIDR", cidr);
        }
        diags
    }
}

impl Network for PacketNetwork {
    fn settings(&self) -> NetworkSettings {
        let c = &self.config;
        NetworkSettings {
            network_mtu: c.network_mtu,
            pod_cidr: c.pod_cidr.clone(),
            service_cidr: c.service_cidr.clone(),
            cluster_domain_suffix: c.cluster_domain_suffix.clone(),
            enable_reporting: c.enable_reporting,
            management_cidrs: c.management_cidrs.clone(),
            node_private_cidr: c.node_private_cidr.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(yaml: &str) -> PacketNetwork {
        let mut network = PacketNetwork::default();
        network.decode(&serde_yaml::from_str(yaml).unwrap()).unwrap();
        network
    }

    #[test]
    fn test_defaults() {
        let settings = decoded("~").settings();
        assert_eq!(settings.network_mtu, 1480);
        assert_eq!(settings.pod_cidr, "10.2.0.0/16");
        assert_eq!(settings.service_cidr, "10.3.0.0/16");
        assert_eq!(settings.cluster_domain_suffix, "cluster.local");
        assert!(settings.management_cidrs.is_empty());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let settings = decoded("network_mtu: 1400\nmanagement_cidrs: [\"0.0.0.0/0\"]").settings();
        assert_eq!(settings.network_mtu, 1400);
        assert_eq!(settings.pod_cidr, "10.2.0.0/16");
        assert_eq!(settings.management_cidrs, vec!["0.0.0.0/0"]);
    }

    #[test]
    fn test_every_invalid_cidr_is_reported() {
        let network = decoded(
            "pod_cidr: bad\nnode_private_cidr: 10.0.0.0/99\nmanagement_cidrs: [\"1.2.3.4/32\", \"x\"]",
        );
        let diags = network.validate();
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut network = PacketNetwork::default();
        let body = serde_yaml::from_str("pod_cdir: 10.0.0.0/16").unwrap();
        assert!(network.decode(&body).is_err());
    }
}
