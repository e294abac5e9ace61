//! Packet (Equinix Metal) platform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::{
    NodeRole, Platform, RenderContext, ReservationGroup, check_reservations,
    check_unique_pool_names, flatten_tags, nodes_depend_on,
};
use crate::assets::expand_home;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dns::{DnsConfig, DnsMode, Route53Dns};
use crate::error::Result;
use crate::extension::{Extension, decode_body};
use crate::flatcar::OsImageSettings;
use crate::network::NetworkSettings;
use crate::template;

const TEMPLATE: &str = include_str!("../../templates/packet.tf.j2");

pub const AUTH_TOKEN_ENV: &str = "PACKET_AUTH_TOKEN";

/// Tag added to every device; a user tag with the same key wins.
pub const VERSION_TAG: &str = "lokoctl-version";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkerPool {
    pub name: String,
    pub count: usize,
    #[serde(default)]
    pub disable_bgp: bool,
    pub ipxe_script_url: Option<String>,
    pub os_arch: Option<String>,
    pub os_channel: Option<String>,
    pub os_version: Option<String>,
    pub node_type: Option<String>,
    pub labels: Option<String>,
    pub taints: Option<String>,
    #[serde(default)]
    pub reservation_ids: BTreeMap<String, String>,
    pub reservation_ids_default: Option<String>,
    #[serde(default)]
    pub setup_raid: bool,
    #[serde(default)]
    pub setup_raid_hdd: bool,
    #[serde(default)]
    pub setup_raid_ssd: bool,
    #[serde(default)]
    pub setup_raid_ssd_fs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    cluster_name: String,
    asset_dir: String,
    auth_token: Option<String>,
    tags: HashMap<String, String>,
    controller_count: usize,
    controller_type: Option<String>,
    dns: DnsConfig,
    facility: String,
    project_id: String,
    ssh_pubkeys: Vec<String>,
    enable_aggregation: bool,
    certs_validity_period_hours: Option<u32>,
    reservation_ids: BTreeMap<String, String>,
    reservation_ids_default: Option<String>,
    worker_pools: Vec<WorkerPool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_name: String::new(),
            asset_dir: String::new(),
            auth_token: None,
            tags: HashMap::new(),
            controller_count: 1,
            controller_type: None,
            dns: DnsConfig::default(),
            facility: String::new(),
            project_id: String::new(),
            ssh_pubkeys: Vec::new(),
            enable_aggregation: true,
            certs_validity_period_hours: None,
            reservation_ids: BTreeMap::new(),
            reservation_ids_default: None,
            worker_pools: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Packet {
    config: Config,
}

pub fn new() -> Box<dyn Platform> {
    Box::new(Packet::default())
}

#[derive(Serialize)]
struct PoolContext<'a> {
    pool: &'a WorkerPool,
    nodes_depend_on: Vec<String>,
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    config: &'a Config,
    tags: Vec<String>,
    network: &'a NetworkSettings,
    flatcar: Option<&'a OsImageSettings>,
    controller_depends_on: Vec<String>,
    pools: Vec<PoolContext<'a>>,
    dns_manual: bool,
    route53: Option<&'a Route53Dns>,
}

fn cluster_target(cluster: &str, resource: &str) -> String {
    format!("module.packet-{cluster}.{resource}")
}

fn pool_target(pool: &str, resource: &str) -> String {
    format!("module.worker-{pool}.{resource}")
}

impl Packet {
    /// User tags on top of the default tags.
    fn tags(&self) -> Vec<String> {
        let mut tags = HashMap::from([(
            VERSION_TAG.to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        )]);
        tags.extend(self.config.tags.clone());
        flatten_tags(&tags)
    }

    /// Hints for the controllers followed by one per worker pool.
    fn dependency_hints(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let c = &self.config;
        let mut groups = vec![ReservationGroup {
            target: cluster_target(&c.cluster_name, "device_ids"),
            reservation_ids: &c.reservation_ids,
        }];
        groups.extend(c.worker_pools.iter().map(|pool| ReservationGroup {
            target: pool_target(&pool.name, "device_ids"),
            reservation_ids: &pool.reservation_ids,
        }));

        let mut hints = nodes_depend_on(&groups).into_iter();
        let controllers = hints.next().unwrap_or_default();
        (controllers, hints.collect())
    }

    fn check_required(&self, diags: &mut Diagnostics) {
        let c = &self.config;
        for (field, value) in [
            ("cluster_name", &c.cluster_name),
            ("asset_dir", &c.asset_dir),
            ("project_id", &c.project_id),
            ("facility", &c.facility),
        ] {
            if value.is_empty() {
                diags.error(
                    format!("{field} is required"),
                    format!("Set cluster.config.{field}"),
                );
            }
        }

        if c.ssh_pubkeys.is_empty() {
            diags.error(
                "At least one SSH public key is required",
                "Set cluster.config.ssh_pubkeys",
            );
        }

        if c.controller_count == 0 {
            diags.error(
                "controller_count must be at least 1",
                "A cluster needs at least one controller node",
            );
        } else if c.controller_count % 2 == 0 {
            diags.push(Diagnostic::warning(
                format!("controller_count {} is even", c.controller_count),
                "etcd tolerates no more failures than with one controller less",
            ));
        }
    }
}

impl Extension for Packet {
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
        let c = &self.config;
        let mut diags = Diagnostics::new();

        self.check_required(&mut diags);

        if c.worker_pools.is_empty() {
            diags.error(
                "At least one worker pool must be defined",
                "Make sure to define at least one entry in cluster.config.worker_pools",
            );
        }
        diags.extend(check_unique_pool_names(
            c.worker_pools.iter().map(|p| p.name.as_str()),
        ));

        diags.extend(check_reservations(
            &c.reservation_ids,
            c.reservation_ids_default.as_deref(),
            &c.cluster_name,
            NodeRole::Controller,
        ));
        for pool in &c.worker_pools {
            diags.extend(check_reservations(
                &pool.reservation_ids,
                pool.reservation_ids_default.as_deref(),
                &pool.name,
                NodeRole::Worker,
            ));
        }

        diags.extend(c.dns.validate());
        diags
    }
}

impl Platform for Packet {
    fn cluster_name(&self) -> &str {
        &self.config.cluster_name
    }

    fn asset_dir(&self) -> PathBuf {
        expand_home(&self.config.asset_dir)
    }

    fn expected_nodes(&self) -> usize {
        self.config.controller_count
            + self
                .config
                .worker_pools
                .iter()
                .map(|p| p.count)
                .sum::<usize>()
    }

    fn dns(&self) -> Option<&DnsConfig> {
        Some(&self.config.dns)
    }

    fn staged_targets(&self) -> Vec<String> {
        let mut targets = vec![cluster_target(
            &self.config.cluster_name,
            "null_resource.dns_entries",
        )];
        targets.extend(
            self.config
                .worker_pools
                .iter()
                .map(|p| pool_target(&p.name, "packet_device.nodes")),
        );
        targets
    }

    fn preflight(&self) -> anyhow::Result<()> {
        let has_token = self.config.auth_token.as_deref().is_some_and(|t| !t.is_empty());
        if !has_token && std::env::var_os(AUTH_TOKEN_ENV).is_none_or(|v| v.is_empty()) {
            anyhow::bail!(
                "cannot find the Packet authentication token: \
                 either specify auth_token or use the {AUTH_TOKEN_ENV} environment variable"
            );
        }
        Ok(())
    }

    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let (controller_depends_on, pool_hints) = self.dependency_hints();
        let pools = self
            .config
            .worker_pools
            .iter()
            .zip(pool_hints)
            .map(|(pool, nodes_depend_on)| PoolContext {
                pool,
                nodes_depend_on,
            })
            .collect();

        let context = TemplateContext {
            config: &self.config,
            tags: self.tags(),
            network: &ctx.network,
            flatcar: ctx.os_image.as_ref(),
            controller_depends_on,
            pools,
            dns_manual: self.dns_mode() == DnsMode::Manual,
            route53: self.config.dns.provider.route53.as_ref(),
        };

        tracing::debug!(cluster = %self.config.cluster_name, "rendering packet cluster config");
        template::render("packet.tf", TEMPLATE, context)
    }
}
