//! Network extensions: cluster networking parameters per platform.

pub mod baremetal;
pub mod packet;

use std::net::IpAddr;

use crate::diagnostics::Diagnostics;
use crate::extension::Extension;

pub const DEFAULT_MTU: u32 = 1480;
pub const DEFAULT_POD_CIDR: &str = "10.2.0.0/16";
pub const DEFAULT_SERVICE_CIDR: &str = "10.3.0.0/16";
pub const DEFAULT_DOMAIN_SUFFIX: &str = "cluster.local";

/// Resolved network parameters, as consumed by platform rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NetworkSettings {
    pub network_mtu: u32,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub cluster_domain_suffix: String,
    pub enable_reporting: bool,
    pub management_cidrs: Vec<String>,
    pub node_private_cidr: Option<String>,
}

pub trait Network: Extension {
    fn settings(&self) -> NetworkSettings;
}

/// Parse `addr/prefix`, rejecting prefixes longer than the address family allows.
pub fn parse_cidr(cidr: &str) -> Result<(IpAddr, u8), String> {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return Err("missing '/' prefix length".to_string());
    };
    let addr: IpAddr = addr.parse().map_err(|e| format!("invalid address: {e}"))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| format!("invalid prefix length {prefix:?}"))?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(format!("prefix length {prefix} exceeds {max}"));
    }
    Ok((addr, prefix))
}

/// Append a diagnostic when `cidr` is not a valid CIDR.
pub(crate) fn check_cidr(diags: &mut Diagnostics, what: &str, cidr: &str) {
    if let Err(reason) = parse_cidr(cidr) {
        diags.error(
            format!("Invalid {what}"),
            format!("{what} {cidr:?} not valid: {reason}"),
        );
    }
}
