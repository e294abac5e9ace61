//! Cluster DNS configuration and the manual DNS hand-off.
//!
//! With the `manual` provider the operator creates the records themselves:
//! after the controllers exist, the `dns_entries` engine output is printed
//! and the apply waits for confirmation before continuing.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::{LokoError, Result};
use crate::output::Output;
use crate::prompt::Prompter;
use crate::terraform::ProvisioningEngine;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DnsConfig {
    pub zone: String,
    #[serde(default)]
    pub provider: DnsProviders,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DnsProviders {
    pub manual: Option<ManualDns>,
    pub route53: Option<Route53Dns>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManualDns {}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Route53Dns {
    pub zone_id: String,
    pub aws_creds_path: Option<String>,
}

/// Which provider manages the cluster's DNS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsMode {
    Manual,
    Route53,
    /// The platform does not manage DNS (e.g. bare metal).
    Unmanaged,
}

impl DnsConfig {
    /// The configured provider, if exactly one is set.
    pub fn mode(&self) -> Option<DnsMode> {
        match (&self.provider.manual, &self.provider.route53) {
            (Some(_), None) => Some(DnsMode::Manual),
            (None, Some(_)) => Some(DnsMode::Route53),
            _ => None,
        }
    }

    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        if self.zone.is_empty() {
            diags.error("DNS zone is required", "Set dns.zone to the cluster's DNS zone");
        }

        match (&self.provider.manual, &self.provider.route53) {
            (None, None) => diags.error(
                "No DNS provider configured",
                "Set exactly one of dns.provider.manual or dns.provider.route53",
            ),
            (Some(_), Some(_)) => diags.error(
                "Multiple DNS providers configured",
                "Set exactly one of dns.provider.manual or dns.provider.route53",
            ),
            (None, Some(route53)) if route53.zone_id.is_empty() => diags.error(
                "Route53 zone ID is required",
                "Set dns.provider.route53.zone_id",
            ),
            _ => {}
        }

        diags
    }
}

/// A DNS record the operator has to create.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DnsEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    pub records: Vec<String>,
}

/// Read `dns_entries` from the engine, show them, and wait for the operator.
///
/// Declining returns [`LokoError::Cancelled`].
pub fn ask_to_configure(
    engine: &dyn ProvisioningEngine,
    config: &DnsConfig,
    prompter: &dyn Prompter,
) -> Result<()> {
    let raw = engine
        .output("dns_entries")
        .map_err(|e| LokoError::engine("reading dns_entries output", e))?;
    let entries: Vec<DnsEntry> = serde_json::from_value(raw)
        .map_err(|e| LokoError::engine("reading dns_entries output", e))?;

    Output::header(format!(
        "Create these DNS records in zone {:?} before continuing:",
        config.zone
    ));
    for entry in &entries {
        Output::kv(
            &entry.name,
            format!(
                "{} ttl={} {}",
                entry.record_type,
                entry.ttl,
                entry.records.join(", ")
            ),
        );
    }
    Output::blank();

    let confirmed = prompter
        .confirm("Have the DNS records been created?")
        .map_err(|e| LokoError::engine("DNS confirmation", e))?;
    if !confirmed {
        return Err(LokoError::Cancelled(
            "DNS entries were not confirmed".to_string(),
        ));
    }

    tracing::info!(count = entries.len(), "manual DNS entries confirmed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> DnsConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_manual_mode() {
        let dns = parse("zone: example.com\nprovider:\n  manual: {}\n");
        assert_eq!(dns.mode(), Some(DnsMode::Manual));
        assert!(dns.validate().is_empty());
    }

    #[test]
    fn test_route53_mode() {
        let dns = parse(
            "zone: example.com\nprovider:\n  route53:\n    zone_id: Z123\n    aws_creds_path: ~/.aws/creds\n",
        );
        assert_eq!(dns.mode(), Some(DnsMode::Route53));
        assert!(dns.validate().is_empty());
    }

    #[test]
    fn test_exactly_one_provider() {
        let none = parse("zone: example.com\n");
        assert_eq!(none.mode(), None);
        assert!(none.validate().has_errors());

        let both = parse("zone: example.com\nprovider:\n  manual: {}\n  route53:\n    zone_id: Z1\n");
        assert_eq!(both.mode(), None);
        assert!(both.validate().has_errors());
    }

    #[test]
    fn test_dns_entry_shape() {
        let entries: Vec<DnsEntry> = serde_json::from_str(
            r#"[{"name":"demo.example.com","type":"A","ttl":300,"records":["10.0.0.1"]}]"#,
        )
        .unwrap();
        assert_eq!(entries[0].record_type, "A");
        assert_eq!(entries[0].records, vec!["10.0.0.1"]);
    }
}
